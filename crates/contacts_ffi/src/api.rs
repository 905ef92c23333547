//! FFI use-case API for the Flutter contacts UI.
//!
//! # Responsibility
//! - Own the process-wide app instance (runtime + state holder).
//! - Expose list/add/delete plus the live list feed as plain envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Errors come back as messages inside the envelope, never as panics.

use contacts_core::ui::contact_list::{ContactListBody, EMPTY_LIST_MESSAGE};
use contacts_core::{
    core_version as core_version_inner, default_log_level as default_log_level_inner,
    init_logging as init_logging_inner, Contact, ContactFeed, ContactService,
    ContactServiceError, CoreConfig, SqliteContactRepository, ValidationMode,
};
use log::{error, info};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

const MAX_WAIT_MS: u32 = 30_000;

static APP: OnceLock<ContactsApp> = OnceLock::new();

struct ContactsApp {
    config: CoreConfig,
    runtime: Runtime,
    service: ContactService<SqliteContactRepository>,
    ui_feed: Mutex<ContactFeed>,
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking. Never throws.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Build-mode default for `init_logging`.
#[flutter_rust_bridge::frb(sync)]
pub fn default_log_level() -> String {
    default_log_level_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may create the log directory.
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens the contacts store and starts the background worker.
///
/// Input semantics:
/// - `db_path`: absolute path of the app-private database file, or
///   `:memory:`.
/// - `strict_phone_format`: also require a phone-number shape, not just
///   non-blank fields.
///
/// # FFI contract
/// - Sync call; opens and migrates the database.
/// - Idempotent for the same arguments; different arguments are rejected.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_contacts(db_path: String, strict_phone_format: bool) -> String {
    let validation = if strict_phone_format {
        ValidationMode::PhoneFormat
    } else {
        ValidationMode::NonBlank
    };
    let config = match CoreConfig::from_db_path(db_path.as_str()) {
        Ok(config) => config.with_validation(validation),
        Err(err) => return err,
    };

    if let Some(app) = APP.get() {
        return ensure_same_config(app, &config);
    }

    let app = match start_app(config.clone()) {
        Ok(app) => app,
        Err(err) => {
            error!("event=contacts_init module=ffi status=error error={err}");
            return err;
        }
    };
    if APP.set(app).is_err() {
        // Lost an init race; the winner's config must match ours.
        return APP
            .get()
            .map_or_else(String::new, |winner| ensure_same_config(winner, &config));
    }

    info!("event=contacts_init module=ffi status=ok");
    String::new()
}

/// One row of the contact list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactItem {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
}

/// List screen payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactListResponse {
    /// Rows in store order; empty when `empty_message` is set.
    pub items: Vec<ContactItem>,
    /// Placeholder text for an empty list.
    pub empty_message: Option<String>,
    /// `false` when a wait timed out without a new snapshot.
    pub changed: bool,
    /// Empty on success, error text otherwise.
    pub error: String,
}

impl ContactListResponse {
    fn from_snapshot(snapshot: &[Contact], changed: bool) -> Self {
        match ContactListBody::from_snapshot(snapshot) {
            ContactListBody::Empty { message } => Self {
                items: Vec::new(),
                empty_message: Some(message.to_string()),
                changed,
                error: String::new(),
            },
            ContactListBody::Rows(rows) => Self {
                items: rows.into_iter().map(to_contact_item).collect(),
                empty_message: None,
                changed,
                error: String::new(),
            },
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            empty_message: Some(EMPTY_LIST_MESSAGE.to_string()),
            changed: false,
            error: error.into(),
        }
    }
}

/// Result of an add/delete intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactActionResponse {
    /// Whether the intent was accepted and queued.
    pub ok: bool,
    /// Whether the UI should leave the current screen.
    pub navigate_back: bool,
    pub message: String,
}

impl ContactActionResponse {
    fn accepted(message: impl Into<String>, navigate_back: bool) -> Self {
        Self {
            ok: true,
            navigate_back,
            message: message.into(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            navigate_back: false,
            message: message.into(),
        }
    }
}

/// Returns the current contact list without waiting.
#[flutter_rust_bridge::frb(sync)]
pub fn list_contacts() -> ContactListResponse {
    match app() {
        Ok(app) => ContactListResponse::from_snapshot(&app.service.contacts().current(), true),
        Err(err) => ContactListResponse::failure(err),
    }
}

/// Waits up to `timeout_ms` for the next contact list snapshot.
///
/// The first call returns the current list immediately; later calls
/// return when a mutation commits or the timeout passes (`changed=false`).
///
/// # FFI contract
/// - Blocking call; run it off the UI thread (default FRB async mode).
/// - Intended for a single list-screen consumer.
pub fn next_contacts(timeout_ms: u32) -> ContactListResponse {
    let app = match app() {
        Ok(app) => app,
        Err(err) => return ContactListResponse::failure(err),
    };
    if tokio::runtime::Handle::try_current().is_ok() {
        return ContactListResponse::failure("next_contacts called from an async context");
    }
    let mut feed = match app.ui_feed.lock() {
        Ok(feed) => feed,
        Err(_) => return ContactListResponse::failure("contact feed lock poisoned"),
    };

    let wait = Duration::from_millis(u64::from(timeout_ms.min(MAX_WAIT_MS)));
    let next = app
        .runtime
        .block_on(async { tokio::time::timeout(wait, feed.next()).await });
    match next {
        Ok(Some(snapshot)) => ContactListResponse::from_snapshot(&snapshot, true),
        Ok(None) => ContactListResponse::failure("contact store closed"),
        Err(_) => ContactListResponse::from_snapshot(&feed.current(), false),
    }
}

/// Save button of the add-contact screen.
///
/// # FFI contract
/// - Sync call; queues the insert and returns before it commits.
/// - Blank fields return `ok=false` and keep the form open.
#[flutter_rust_bridge::frb(sync)]
pub fn add_contact(name: String, phone_number: String) -> ContactActionResponse {
    let app = match app() {
        Ok(app) => app,
        Err(err) => return ContactActionResponse::rejected(err),
    };
    match app.service.add_contact(name, phone_number) {
        Ok(()) => ContactActionResponse::accepted("Contact saved.", true),
        Err(err) => ContactActionResponse::rejected(intent_error_message(&err)),
    }
}

/// Confirm button of the delete dialog.
///
/// # FFI contract
/// - Sync call; queues the delete and returns before it commits.
/// - Deleting an id that is already gone is not an error.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_contact(id: i64, name: String, phone_number: String) -> ContactActionResponse {
    let app = match app() {
        Ok(app) => app,
        Err(err) => return ContactActionResponse::rejected(err),
    };
    let contact = Contact {
        id,
        name,
        phone_number,
    };
    match app.service.delete_contact(contact) {
        Ok(()) => ContactActionResponse::accepted("Contact deleted.", false),
        Err(err) => ContactActionResponse::rejected(intent_error_message(&err)),
    }
}

fn app() -> Result<&'static ContactsApp, String> {
    APP.get()
        .ok_or_else(|| "contacts not initialized; call init_contacts first".to_string())
}

fn start_app(config: CoreConfig) -> Result<ContactsApp, String> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("contacts-worker")
        .enable_time()
        .build()
        .map_err(|err| format!("failed to start contacts runtime: {err}"))?;
    let repo = config
        .open_repository()
        .map_err(|err| format!("contacts DB open failed: {err}"))?;
    let service = ContactService::with_policy(
        Arc::new(repo),
        runtime.handle(),
        config.validation.policy(),
    );
    let ui_feed = Mutex::new(service.contacts());

    Ok(ContactsApp {
        config,
        runtime,
        service,
        ui_feed,
    })
}

fn ensure_same_config(app: &ContactsApp, config: &CoreConfig) -> String {
    if &app.config == config {
        String::new()
    } else {
        format!(
            "contacts already initialized with {:?}; refusing to switch to {:?}",
            app.config, config
        )
    }
}

fn intent_error_message(err: &ContactServiceError) -> String {
    match err {
        ContactServiceError::Invalid(reason) => format!("Invalid contact: {reason}."),
        ContactServiceError::Closed => "Contacts are shutting down.".to_string(),
    }
}

fn to_contact_item(contact: Contact) -> ContactItem {
    ContactItem {
        id: contact.id,
        name: contact.name,
        phone_number: contact.phone_number,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        add_contact, core_version, delete_contact, init_contacts, init_logging, list_contacts,
        next_contacts,
    };
    use std::time::{Duration, Instant};

    fn ensure_app() {
        let error = init_contacts(":memory:".to_string(), false);
        assert!(error.is_empty(), "{error}");
    }

    fn wait_until(predicate: impl Fn(&super::ContactListResponse) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            let response = next_contacts(100);
            assert!(response.error.is_empty(), "{}", response.error);
            if predicate(&list_contacts()) {
                return;
            }
        }
        panic!("contact list never reached the expected state");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn init_contacts_rejects_relative_path_and_reconfiguration() {
        assert!(init_contacts("contacts.db".to_string(), false).contains("absolute"));

        ensure_app();
        ensure_app();
        let conflict = init_contacts(":memory:".to_string(), true);
        assert!(conflict.contains("refusing to switch"));
    }

    #[test]
    fn blank_name_is_rejected_and_keeps_form_open() {
        ensure_app();
        let response = add_contact("  ".to_string(), "555-0100".to_string());
        assert!(!response.ok);
        assert!(!response.navigate_back);
        assert!(response.message.contains("name must not be blank"));
    }

    #[test]
    fn added_contact_appears_and_can_be_deleted() {
        ensure_app();
        let name = format!("ffi-{}", std::process::id());

        let added = add_contact(name.clone(), "555-0100".to_string());
        assert!(added.ok, "{}", added.message);
        assert!(added.navigate_back);
        wait_until(|list| list.items.iter().any(|item| item.name == name));

        let item = list_contacts()
            .items
            .into_iter()
            .find(|item| item.name == name)
            .expect("added contact should be listed");
        let deleted = delete_contact(item.id, item.name, item.phone_number);
        assert!(deleted.ok, "{}", deleted.message);
        wait_until(|list| list.items.iter().all(|row| row.name != name));
    }
}
