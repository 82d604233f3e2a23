use daytrack_core::db::open_db_in_memory;
use daytrack_core::{
    AuthError, AuthService, IdentityProvider, ProviderError, ProviderIdentity, ProviderResult,
    SqliteUserRepository, UserRepository, MIN_PASSWORD_CHARS,
};
use std::cell::Cell;
use std::rc::Rc;

/// Provider stub: returns one configured identity or one configured
/// failure, and counts round trips so tests can assert the pre-flight
/// checks short-circuit.
struct MockProvider {
    identity: ProviderIdentity,
    fail_with: Option<ProviderError>,
    calls: Rc<Cell<u32>>,
}

impl MockProvider {
    fn returning(identity: ProviderIdentity) -> Self {
        Self {
            identity,
            fail_with: None,
            calls: Rc::new(Cell::new(0)),
        }
    }

    fn failing(error: ProviderError) -> Self {
        Self {
            identity: ada(),
            fail_with: Some(error),
            calls: Rc::new(Cell::new(0)),
        }
    }

    fn respond(&self) -> ProviderResult<ProviderIdentity> {
        self.calls.set(self.calls.get() + 1);
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(self.identity.clone()),
        }
    }
}

impl IdentityProvider for MockProvider {
    fn sign_up(&self, _email: &str, _password: &str) -> ProviderResult<ProviderIdentity> {
        self.respond()
    }

    fn sign_in(&self, _email: &str, _password: &str) -> ProviderResult<ProviderIdentity> {
        self.respond()
    }

    fn sign_in_with_google(&self) -> ProviderResult<ProviderIdentity> {
        self.respond()
    }

    fn send_password_reset(&self, _email: &str) -> ProviderResult<()> {
        self.calls.set(self.calls.get() + 1);
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn sign_out(&self, _uid: &str) -> ProviderResult<()> {
        Ok(())
    }
}

fn ada() -> ProviderIdentity {
    ProviderIdentity {
        uid: "uid-ada".to_string(),
        email: "ada@example.com".to_string(),
        display_name: "Ada".to_string(),
        photo_url: None,
    }
}

#[test]
fn sign_up_opens_session_and_mirrors_profile() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let mut auth = AuthService::new(MockProvider::returning(ada()), users);

    let profile = auth.sign_up("ada@example.com", "secret1").unwrap();
    assert_eq!(profile.uid, "uid-ada");
    assert_eq!(auth.current_uid(), Some("uid-ada"));

    let stored = SqliteUserRepository::try_new(&conn)
        .unwrap()
        .get_user("uid-ada")
        .unwrap()
        .unwrap();
    assert_eq!(stored.email, "ada@example.com");
    assert_eq!(stored.display_name, "Ada");
}

#[test]
fn sign_up_rejects_short_password_before_provider_call() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let provider = MockProvider::returning(ada());
    let calls = Rc::clone(&provider.calls);
    let mut auth = AuthService::new(provider, users);

    let result = auth.sign_up("ada@example.com", "short");
    assert!(matches!(
        result,
        Err(AuthError::PasswordTooShort { min }) if min == MIN_PASSWORD_CHARS
    ));
    assert!(auth.current_uid().is_none());
    // The provider was never contacted.
    assert_eq!(calls.get(), 0);
}

#[test]
fn malformed_email_is_rejected_before_provider_call() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let mut auth = AuthService::new(MockProvider::returning(ada()), users);

    assert!(matches!(
        auth.sign_in("not-an-email", "secret1"),
        Err(AuthError::InvalidEmail(_))
    ));
    assert!(matches!(
        auth.send_password_reset("also bad"),
        Err(AuthError::InvalidEmail(_))
    ));
    assert!(auth.current_uid().is_none());
}

#[test]
fn failed_sign_in_leaves_no_session() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let mut auth = AuthService::new(
        MockProvider::failing(ProviderError::InvalidCredentials),
        users,
    );

    let result = auth.sign_in("ada@example.com", "wrongpass");
    assert!(matches!(
        result,
        Err(AuthError::Provider(ProviderError::InvalidCredentials))
    ));
    assert!(auth.current_uid().is_none());
    assert!(matches!(
        auth.current_profile(),
        Err(AuthError::NotSignedIn)
    ));
}

#[test]
fn sign_in_refreshes_existing_profile() {
    let conn = open_db_in_memory().unwrap();

    {
        let users = SqliteUserRepository::try_new(&conn).unwrap();
        let mut auth = AuthService::new(MockProvider::returning(ada()), users);
        auth.sign_up("ada@example.com", "secret1").unwrap();
    }

    let mut renamed = ada();
    renamed.display_name = "Ada L.".to_string();
    renamed.photo_url = Some("https://example.com/ada.png".to_string());

    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let mut auth = AuthService::new(MockProvider::returning(renamed), users);
    auth.sign_in("ada@example.com", "secret1").unwrap();

    let profile = auth.current_profile().unwrap();
    assert_eq!(profile.display_name, "Ada L.");
    assert_eq!(profile.photo_url.as_deref(), Some("https://example.com/ada.png"));
}

#[test]
fn google_sign_in_falls_back_to_email_local_part_for_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let mut identity = ada();
    identity.display_name = String::new();
    let mut auth = AuthService::new(MockProvider::returning(identity), users);

    let profile = auth.sign_in_with_google().unwrap();
    assert_eq!(profile.display_name, "ada");
    assert_eq!(auth.current_uid(), Some("uid-ada"));
}

#[test]
fn sign_out_clears_session_once() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let mut auth = AuthService::new(MockProvider::returning(ada()), users);

    auth.sign_up("ada@example.com", "secret1").unwrap();
    auth.sign_out().unwrap();
    assert!(auth.current_uid().is_none());
    assert!(matches!(auth.sign_out(), Err(AuthError::NotSignedIn)));
}

#[test]
fn password_reset_does_not_touch_session() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let mut auth = AuthService::new(MockProvider::returning(ada()), users);

    auth.sign_up("ada@example.com", "secret1").unwrap();
    auth.send_password_reset("ada@example.com").unwrap();
    assert_eq!(auth.current_uid(), Some("uid-ada"));
}
