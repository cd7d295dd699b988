// Session token round-trip and rejection cases

use crate::common;
use stock_service::auth::token::TokenService;
use stock_service::core::errors::ServiceError;
use stock_service::core::models::{Role, User};

fn sample_user() -> User {
    User {
        id: 7,
        username: "alice".to_string(),
        password: String::new(),
        role: Role::Admin,
    }
}

#[test]
fn test_issued_token_round_trips() {
    let tokens = common::test_token_service();
    let user = sample_user();

    let token = tokens.issue(&user).expect("issue token");
    let identity = tokens.verify(&token).expect("verify token");

    assert_eq!(identity.user_id, 7);
    assert_eq!(identity.username, "alice");
    assert_eq!(identity.role, Role::Admin);
}

#[test]
fn test_expired_token_rejected() {
    let tokens = common::test_token_service();
    let token = common::expired_token("alice");

    match tokens.verify(&token) {
        Err(ServiceError::Unauthenticated) => (),
        other => panic!("Expected Unauthenticated, got {:?}", other),
    }
}

#[test]
fn test_token_signed_with_other_secret_rejected() {
    let issuer = TokenService::new("some-other-secret", 3600);
    let verifier = common::test_token_service();

    let token = issuer.issue(&sample_user()).expect("issue token");
    assert!(verifier.verify(&token).is_err());
}

#[test]
fn test_garbage_token_rejected() {
    let tokens = common::test_token_service();

    assert!(tokens.verify("not-a-token").is_err());
    assert!(tokens.verify("").is_err());
    assert!(tokens.verify("aaaa.bbbb.cccc").is_err());
}

#[test]
fn test_role_survives_round_trip() {
    let tokens = common::test_token_service();
    let user = User {
        id: 2,
        username: "bob".to_string(),
        password: String::new(),
        role: Role::User,
    };

    let token = tokens.issue(&user).expect("issue token");
    let identity = tokens.verify(&token).expect("verify token");

    assert_eq!(identity.role, Role::User);
    assert!(!identity.is_admin());
}
