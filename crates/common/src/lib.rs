pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn envelope_serializes_success_flag() {
        let body = types::ApiResponse::ok("done", serde_json::json!({"id": 1}));
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["message"], "done");
        assert_eq!(v["data"]["id"], 1);
    }
}
