use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::domain::{ClientMeta, LoginInput, RegisterInput};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::{AuthConfig, AuthService};

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(repo.clone(), AuthConfig::with_secret("bench-secret"));

    // register and verify the account outside the measured loop
    let rt = tokio::runtime::Runtime::new().unwrap();
    let registered = rt
        .block_on(svc.register(
            RegisterInput {
                email: "bench@example.com".into(),
                username: "bench_user".into(),
                first_name: "Bench".into(),
                last_name: "Mark".into(),
                phone: None,
                role: None,
                password: "Benchmark1".into(),
                password_confirm: "Benchmark1".into(),
            },
            ClientMeta::default(),
        ))
        .unwrap();
    repo.update_user(registered.user_id, |u| u.is_email_verified = true);

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt
                .block_on(svc.login(
                    LoginInput { email: "bench@example.com".into(), password: "Benchmark1".into() },
                    ClientMeta::default(),
                ))
                .unwrap();
        });
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
