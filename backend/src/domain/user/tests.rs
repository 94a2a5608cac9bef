//! Tests for the user identity model.

use super::*;
use chrono::TimeZone;
use rstest::rstest;

fn sample_user(username: &str, email: &str) -> User {
    User::new(
        UserId::new(1),
        Username::new(username).expect("valid username"),
        EmailAddress::new(email).expect("valid email"),
        "$argon2id$stub".to_owned(),
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid timestamp"),
        false,
    )
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("   ", UserValidationError::EmptyUsername)]
#[case("has space", UserValidationError::UsernameInvalidCharacters)]
#[case("bad$char", UserValidationError::UsernameInvalidCharacters)]
#[case("émile", UserValidationError::UsernameInvalidCharacters)]
fn username_rejects_invalid_input(#[case] input: &str, #[case] expected: UserValidationError) {
    let err = Username::new(input).expect_err("invalid username must fail");
    assert_eq!(err, expected);
}

#[rstest]
fn username_rejects_overlong_input() {
    let err = Username::new("a".repeat(USERNAME_MAX + 1)).expect_err("overlong must fail");
    assert_eq!(err, UserValidationError::UsernameTooLong { max: USERNAME_MAX });
}

#[rstest]
#[case("alice")]
#[case("Alice_99")]
#[case("  kenneth  ")]
fn username_accepts_and_trims_valid_input(#[case] input: &str) {
    let username = Username::new(input).expect("valid username");
    assert_eq!(username.as_ref(), input.trim());
}

#[rstest]
fn username_folding_is_case_insensitive() {
    let stored = Username::new("Alice").expect("valid username");
    let queried = Username::new("aLiCe").expect("valid username");
    assert_eq!(stored.folded(), queried.folded());
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::EmailMalformed)]
#[case("@missing-local", UserValidationError::EmailMalformed)]
#[case("missing-domain@", UserValidationError::EmailMalformed)]
#[case("two@at@signs", UserValidationError::EmailMalformed)]
#[case("spaced name@example.com", UserValidationError::EmailMalformed)]
fn email_rejects_invalid_input(#[case] input: &str, #[case] expected: UserValidationError) {
    let err = EmailAddress::new(input).expect_err("invalid email must fail");
    assert_eq!(err, expected);
}

#[rstest]
#[case("alice@example.com")]
#[case("  kenneth@teamtreehouse.com  ")]
fn email_accepts_and_trims_valid_input(#[case] input: &str) {
    let email = EmailAddress::new(input).expect("valid email");
    assert_eq!(email.as_ref(), input.trim());
}

#[rstest]
fn email_serde_round_trips_through_string() {
    let email = EmailAddress::new("alice@example.com").expect("valid email");
    let encoded = serde_json::to_string(&email).expect("serialize");
    assert_eq!(encoded, "\"alice@example.com\"");
    let decoded: EmailAddress = serde_json::from_str(&encoded).expect("deserialize");
    assert_eq!(decoded, email);
}

#[rstest]
fn user_exposes_validated_components() {
    let user = sample_user("alice", "alice@example.com");

    assert_eq!(user.id(), UserId::new(1));
    assert_eq!(user.username().as_ref(), "alice");
    assert_eq!(user.email().as_ref(), "alice@example.com");
    assert_eq!(user.password_hash(), "$argon2id$stub");
    assert!(!user.is_admin());
}
