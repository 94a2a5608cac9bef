//! Identity domain service: registration, authentication, and lookups.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::auth::{LoginCredentials, RegistrationRequest};
use crate::domain::error::{Error, ErrorCode};
use crate::domain::ports::{NewUser, PasswordHasher, UserPersistenceError, UserRepository};
use crate::domain::session::Session;
use crate::domain::user::User;

/// Decoy hash verified against when an email lookup misses, so the miss path
/// performs the same hashing work as a password mismatch.
const DECOY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Single user-visible failure for both authentication miss paths.
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Identity service over the user repository and hashing capability.
///
/// Uniqueness is enforced by the storage constraints, never by a
/// check-then-act pre-read, so concurrent duplicate registrations resolve to
/// exactly one winner.
#[derive(Clone)]
pub struct IdentityService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> IdentityService<R, H> {
    /// Create a new service over a user repository and password hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

/// Shared mapping from user persistence failures to domain errors.
pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::Duplicate { .. } => Error::duplicate_identity("user already exists"),
    }
}

impl<R, H> IdentityService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    /// Register a new account.
    ///
    /// The password is hashed before the repository is consulted; a
    /// uniqueness collision on username or email surfaces as
    /// [`ErrorCode::DuplicateIdentity`] with no partial record left behind.
    pub async fn create_user(&self, request: &RegistrationRequest) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(request.password())
            .map_err(|err| Error::internal(err.to_string()))?;

        let new_user = NewUser {
            username: request.username().clone(),
            email: request.email().clone(),
            password_hash,
            joined_at: self.clock.utc(),
            is_admin: request.is_admin(),
        };

        self.users
            .insert(&new_user)
            .await
            .map_err(map_user_persistence_error)
    }

    /// Authenticate by email and password.
    ///
    /// A missing account and a wrong password fail with the byte-identical
    /// [`ErrorCode::Unauthorized`] error; the miss path burns a verification
    /// against a decoy hash so the two are not separable by timing either.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        let maybe_user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?;

        let Some(user) = maybe_user else {
            let _ = self
                .hasher
                .verify(credentials.password(), DECOY_PASSWORD_HASH);
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let verified = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .map_err(|err| Error::internal(err.to_string()))?;

        if !verified {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        Ok(Session::for_user(user))
    }

    /// Look up a user by case-insensitive exact username match.
    pub async fn find_by_username_ci(&self, username: &str) -> Result<User, Error> {
        let maybe_user = self
            .users
            .find_by_username_ci(username)
            .await
            .map_err(map_user_persistence_error)?;

        maybe_user.ok_or_else(|| Error::not_found("user not found"))
    }

    /// Create the seed admin account, treating an existing account as
    /// success so repeated startups are harmless.
    pub async fn ensure_seed_admin(&self, request: RegistrationRequest) -> Result<(), Error> {
        let request = request.with_admin();
        match self.create_user(&request).await {
            Ok(user) => {
                info!(username = %user.username(), "seed admin created");
                Ok(())
            }
            Err(err) if err.code() == ErrorCode::DuplicateIdentity => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for registration and authentication flows.
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::PasswordHashError;
    use crate::domain::user::{EmailAddress, UserId};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[derive(Default)]
    struct StubUserRepository {
        state: Mutex<Vec<User>>,
        fail_next_insert: Mutex<Option<UserPersistenceError>>,
    }

    impl StubUserRepository {
        fn stored(&self) -> Vec<User> {
            self.state.lock().expect("state lock").clone()
        }

        fn set_insert_failure(&self, failure: UserPersistenceError) {
            *self.fail_next_insert.lock().expect("state lock") = Some(failure);
        }
    }

    #[async_trait]
    impl UserRepository for StubUserRepository {
        async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
            if let Some(failure) = self.fail_next_insert.lock().expect("state lock").take() {
                return Err(failure);
            }
            let mut state = self.state.lock().expect("state lock");
            let duplicate = state.iter().any(|existing| {
                existing.username().folded() == user.username.folded()
                    || existing.email() == &user.email
            });
            if duplicate {
                return Err(UserPersistenceError::duplicate("users_username_lower_key"));
            }
            let id = i64::try_from(state.len()).expect("small test vector") + 1;
            let stored = User::new(
                UserId::new(id),
                user.username.clone(),
                user.email.clone(),
                user.password_hash.clone(),
                user.joined_at,
                user.is_admin,
            );
            state.push(stored.clone());
            Ok(stored)
        }

        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
            let state = self.state.lock().expect("state lock");
            Ok(state.iter().find(|user| user.id() == id).cloned())
        }

        async fn find_by_email(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<User>, UserPersistenceError> {
            let state = self.state.lock().expect("state lock");
            Ok(state.iter().find(|user| user.email() == email).cloned())
        }

        async fn find_by_username_ci(
            &self,
            username: &str,
        ) -> Result<Option<User>, UserPersistenceError> {
            let folded = username.to_ascii_lowercase();
            let state = self.state.lock().expect("state lock");
            Ok(state
                .iter()
                .find(|user| user.username().folded() == folded)
                .cloned())
        }
    }

    /// Reversible stand-in hasher; counts verifications for the decoy check.
    struct StubHasher {
        verify_calls: AtomicUsize,
    }

    impl StubHasher {
        fn new() -> Self {
            Self {
                verify_calls: AtomicUsize::new(0),
            }
        }

        fn verify_call_count(&self) -> usize {
            self.verify_calls.load(Ordering::Relaxed)
        }
    }

    impl PasswordHasher for StubHasher {
        fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
            Ok(format!("hashed:{plaintext}"))
        }

        fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordHashError> {
            self.verify_calls.fetch_add(1, Ordering::Relaxed);
            Ok(hash == format!("hashed:{plaintext}"))
        }
    }

    fn service(
        repository: Arc<StubUserRepository>,
        hasher: Arc<StubHasher>,
    ) -> IdentityService<StubUserRepository, StubHasher> {
        IdentityService::new(repository, hasher, Arc::new(FixedClock(fixed_now())))
    }

    fn registration(username: &str, email: &str, password: &str) -> RegistrationRequest {
        RegistrationRequest::try_from_parts(username, email, password)
            .expect("valid registration")
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("valid credentials")
    }

    #[tokio::test]
    async fn create_user_hashes_password_and_stamps_joined_at() {
        let repository = Arc::new(StubUserRepository::default());
        let service = service(repository.clone(), Arc::new(StubHasher::new()));

        let user = service
            .create_user(&registration("alice", "alice@example.com", "secret"))
            .await
            .expect("registration succeeds");

        assert_eq!(user.username().as_ref(), "alice");
        assert_eq!(user.password_hash(), "hashed:secret");
        assert_eq!(user.joined_at(), fixed_now());
        assert!(!user.is_admin());
        assert_eq!(repository.stored().len(), 1);
    }

    #[tokio::test]
    async fn create_user_followed_by_authenticate_round_trips() {
        let repository = Arc::new(StubUserRepository::default());
        let service = service(repository, Arc::new(StubHasher::new()));

        service
            .create_user(&registration("alice", "alice@example.com", "secret"))
            .await
            .expect("registration succeeds");

        let session = service
            .authenticate(&credentials("alice@example.com", "secret"))
            .await
            .expect("authentication succeeds");

        assert_eq!(session.username().as_ref(), "alice");
    }

    #[rstest]
    #[case("Alice", "other@example.com")]
    #[case("someone_else", "alice@example.com")]
    #[tokio::test]
    async fn create_user_maps_uniqueness_collisions_to_duplicate_identity(
        #[case] username: &str,
        #[case] email: &str,
    ) {
        let repository = Arc::new(StubUserRepository::default());
        let service = service(repository.clone(), Arc::new(StubHasher::new()));

        service
            .create_user(&registration("alice", "alice@example.com", "secret"))
            .await
            .expect("first registration succeeds");

        let err = service
            .create_user(&registration(username, email, "secret"))
            .await
            .expect_err("second registration must fail");

        assert_eq!(err.code(), ErrorCode::DuplicateIdentity);
        assert_eq!(err.message(), "user already exists");
        assert_eq!(repository.stored().len(), 1);
    }

    #[tokio::test]
    async fn authenticate_failures_are_indistinguishable() {
        let repository = Arc::new(StubUserRepository::default());
        let hasher = Arc::new(StubHasher::new());
        let service = service(repository, hasher.clone());

        service
            .create_user(&registration("alice", "alice@example.com", "secret"))
            .await
            .expect("registration succeeds");

        let wrong_password = service
            .authenticate(&credentials("alice@example.com", "nope"))
            .await
            .expect_err("wrong password must fail");
        let unknown_email = service
            .authenticate(&credentials("nobody@example.com", "secret"))
            .await
            .expect_err("unknown email must fail");

        assert_eq!(wrong_password, unknown_email);
        assert_eq!(unknown_email.code(), ErrorCode::Unauthorized);
        // One verification per attempt: real hash, then decoy.
        assert_eq!(hasher.verify_call_count(), 2);
    }

    #[tokio::test]
    async fn find_by_username_ci_matches_any_casing() {
        let repository = Arc::new(StubUserRepository::default());
        let service = service(repository, Arc::new(StubHasher::new()));

        service
            .create_user(&registration("alice", "alice@example.com", "secret"))
            .await
            .expect("registration succeeds");

        let found = service
            .find_by_username_ci("Alice")
            .await
            .expect("lookup succeeds");
        assert_eq!(found.username().as_ref(), "alice");

        let err = service
            .find_by_username_ci("bob")
            .await
            .expect_err("missing user must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn ensure_seed_admin_is_idempotent() {
        let repository = Arc::new(StubUserRepository::default());
        let service = service(repository.clone(), Arc::new(StubHasher::new()));
        let seed = registration("kennethlove", "kenneth@teamtreehouse.com", "password");

        service
            .ensure_seed_admin(seed.clone())
            .await
            .expect("first seed succeeds");
        service
            .ensure_seed_admin(seed)
            .await
            .expect("repeat seed is a no-op");

        let stored = repository.stored();
        assert_eq!(stored.len(), 1);
        assert!(stored.first().expect("seeded user").is_admin());
    }

    #[rstest]
    #[case(UserPersistenceError::connection("database unavailable"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("database query failed"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn create_user_maps_persistence_failures(
        #[case] failure: UserPersistenceError,
        #[case] expected_code: ErrorCode,
    ) {
        let repository = Arc::new(StubUserRepository::default());
        repository.set_insert_failure(failure);
        let service = service(repository, Arc::new(StubHasher::new()));

        let err = service
            .create_user(&registration("alice", "alice@example.com", "secret"))
            .await
            .expect_err("persistence failures surface as domain errors");

        assert_eq!(err.code(), expected_code);
    }

    #[rstest]
    fn decoy_hash_is_a_parseable_phc_string() {
        assert!(DECOY_PASSWORD_HASH.starts_with("$argon2id$"));
        assert_eq!(DECOY_PASSWORD_HASH.split('$').count(), 6);
    }
}
