use lume_backend::config::JwtConfig;
use lume_backend::util::jwt::*;

fn create_test_jwt_utils() -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig::default())
}

const USER_ID: &str = "64b7f0c2a1b2c3d4e5f60718";

#[test]
fn test_token_type_as_str() {
    assert_eq!(TokenType::Access.as_str(), "access");
    assert_eq!(TokenType::Refresh.as_str(), "refresh");
}

#[test]
fn test_access_token_carries_role() {
    let jwt_utils = create_test_jwt_utils();
    let token = jwt_utils.generate_access_token(USER_ID, "admin").unwrap();
    let claims = jwt_utils.validate_access_token(&token).unwrap();
    assert_eq!(claims.sub, USER_ID);
    assert_eq!(claims.token_type, "access");
    assert!(claims.is_admin());
    assert_eq!(claims.exp - claims.iat, 15 * 60);
}

#[test]
fn test_refresh_token_has_no_role() {
    let jwt_utils = create_test_jwt_utils();
    let token = jwt_utils.generate_refresh_token(USER_ID).unwrap();
    let claims = jwt_utils.validate_refresh_token(&token).unwrap();
    assert_eq!(claims.sub, USER_ID);
    assert!(claims.role.is_none());
    assert_eq!(claims.token_type, "refresh");
}

#[test]
fn test_tokens_are_not_interchangeable() {
    let jwt_utils = create_test_jwt_utils();
    let pair = jwt_utils.generate_token_pair(USER_ID, "user").unwrap();
    // Different secrets, so the signature check fails first.
    assert!(jwt_utils.validate_access_token(&pair.refresh_token).is_err());
    assert!(jwt_utils.validate_refresh_token(&pair.access_token).is_err());
}

#[test]
fn test_same_secret_still_checks_token_type() {
    let mut config = JwtConfig::default();
    config.refresh_token_secret = config.access_token_secret.clone();
    let jwt_utils = JwtTokenUtilsImpl::new(config);
    let refresh = jwt_utils.generate_refresh_token(USER_ID).unwrap();
    match jwt_utils.validate_access_token(&refresh) {
        Err(JwtError::InvalidTokenType { expected, actual }) => {
            assert_eq!(expected, "access");
            assert_eq!(actual, "refresh");
        }
        other => panic!("expected a token type error, got {:?}", other),
    }
}

#[test]
fn test_two_pairs_for_same_user_differ() {
    let jwt_utils = create_test_jwt_utils();
    let a = jwt_utils.generate_token_pair(USER_ID, "user").unwrap();
    let b = jwt_utils.generate_token_pair(USER_ID, "user").unwrap();
    assert_ne!(a.refresh_token, b.refresh_token);
    assert_ne!(a.access_token, b.access_token);
}

#[test]
fn test_expired_token_rejected() {
    use jsonwebtoken::{encode, EncodingKey, Header};
    let config = JwtConfig::default();
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: USER_ID.to_string(),
        role: Some("user".to_string()),
        iat: now - 3600,
        exp: now - 60,
        token_type: "access".to_string(),
        jti: "expired".to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_token_secret.as_bytes()),
    )
    .unwrap();
    let jwt_utils = JwtTokenUtilsImpl::new(config);
    assert!(matches!(jwt_utils.validate_access_token(&token), Err(JwtError::TokenExpired)));
}

#[test]
fn test_tampered_token_rejected() {
    let jwt_utils = create_test_jwt_utils();
    let mut token = jwt_utils.generate_access_token(USER_ID, "user").unwrap();
    token.push('x');
    assert!(jwt_utils.validate_access_token(&token).is_err());
}

#[test]
fn test_extract_token_from_header() {
    let jwt_utils = create_test_jwt_utils();
    assert_eq!(jwt_utils.extract_token_from_header("Bearer abc.def").unwrap(), "abc.def");
    assert!(jwt_utils.extract_token_from_header("Basic abc").is_err());
    assert!(jwt_utils.extract_token_from_header("Bearer   ").is_err());
}
