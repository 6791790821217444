//! Small query-building helpers shared by list endpoints.

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::EntityTrait;

const LIKE_ESCAPE: char = '\\';

/// Escape `%`, `_` and the escape character so `term` matches literally inside a LIKE pattern.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Case-insensitive substring match on a column of `E`.
pub fn icontains<E: EntityTrait>(col: E::Column, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&term.trim().to_lowercase()));
    Expr::expr(Func::lower(Expr::col((E::default(), col)))).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/// Case-insensitive equality on a column of `E`.
pub fn ieq<E: EntityTrait>(col: E::Column, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((E::default(), col)))).eq(value.trim().to_lowercase())
}

/// Trimmed, non-empty search term.
pub fn term(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{PostgresQueryBuilder, Query};

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(escape_like("a_b%c"), r"a\_b\%c");
        assert_eq!(escape_like(r"back\slash"), r"back\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn contains_filter_carries_escape_clause() {
        let sql = Query::select()
            .column(models::customer::Column::Id)
            .from(models::customer::Entity)
            .and_where(icontains::<models::customer::Entity>(models::customer::Column::Name, " _ "))
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(sql.contains(r"\_"), "{sql}");
    }
}
