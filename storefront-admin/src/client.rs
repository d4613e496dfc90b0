//! Admin client contract, decorators and sub-client composition.

use crate::config::ClientConfig;
use crate::{AdminResult, ConfigError, View};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// CLIENT TRAIT
// ============================================================================

/// Admin client producing one section of a page.
///
/// Each method returns the rendered fragment of the client. Clients
/// composed of sub-clients concatenate the fragments of their children.
pub trait Client: Send + Sync {
    /// Fragment for a new item.
    fn create(&self, view: &mut View) -> AdminResult<String>;

    /// Fragment for a copy of the item.
    fn copy(&self, view: &mut View) -> AdminResult<String>;

    /// Fragment for editing the item.
    fn get(&self, view: &mut View) -> AdminResult<String>;

    /// Persist the submitted data.
    fn save(&self, view: &mut View) -> AdminResult<String>;
}

/// Action dispatched to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    Create,
    Copy,
    Get,
    Save,
}

impl ClientAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientAction::Create => "create",
            ClientAction::Copy => "copy",
            ClientAction::Get => "get",
            ClientAction::Save => "save",
        }
    }

    /// Run the action on `client`.
    pub fn dispatch(&self, client: &dyn Client, view: &mut View) -> AdminResult<String> {
        match self {
            ClientAction::Create => client.create(view),
            ClientAction::Copy => client.copy(view),
            ClientAction::Get => client.get(view),
            ClientAction::Save => client.save(view),
        }
    }
}

impl fmt::Display for ClientAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Run `action` on all `clients` in order and concatenate their fragments.
pub fn render_all(clients: &[Arc<dyn Client>], action: ClientAction, view: &mut View) -> AdminResult<String> {
    let mut body = String::new();
    for client in clients {
        body.push_str(&action.dispatch(client.as_ref(), view)?);
    }
    Ok(body)
}

// ============================================================================
// DECORATORS
// ============================================================================

/// Names of the available decorators.
pub const DECORATORS: [&str; 1] = ["log"];

/// Logs every call of the wrapped client.
pub struct LogDecorator {
    name: String,
    inner: Arc<dyn Client>,
}

impl LogDecorator {
    pub fn new(name: impl Into<String>, inner: Arc<dyn Client>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    fn call(&self, action: ClientAction, view: &mut View) -> AdminResult<String> {
        tracing::debug!(client = %self.name, action = %action, "Calling admin client");
        let result = action.dispatch(self.inner.as_ref(), view);
        if let Err(err) = &result {
            tracing::warn!(client = %self.name, action = %action, error = %err, "Admin client failed");
        }
        result
    }
}

impl Client for LogDecorator {
    fn create(&self, view: &mut View) -> AdminResult<String> {
        self.call(ClientAction::Create, view)
    }

    fn copy(&self, view: &mut View) -> AdminResult<String> {
        self.call(ClientAction::Copy, view)
    }

    fn get(&self, view: &mut View) -> AdminResult<String> {
        self.call(ClientAction::Get, view)
    }

    fn save(&self, view: &mut View) -> AdminResult<String> {
        self.call(ClientAction::Save, view)
    }
}

/// Wrap `client` into the named decorators, first name innermost.
pub fn decorate(name: &str, client: Arc<dyn Client>, decorators: &[String]) -> Result<Arc<dyn Client>, ConfigError> {
    decorators.iter().try_fold(client, |inner, decorator| match decorator.as_str() {
        "log" => Ok(Arc::new(LogDecorator::new(name, inner)) as Arc<dyn Client>),
        other => Err(ConfigError::UnknownDecorator {
            name: other.to_string(),
        }),
    })
}

// ============================================================================
// SUB-CLIENTS
// ============================================================================

/// Named sub-clients available to a composite client.
#[derive(Default, Clone)]
pub struct ClientRegistry {
    clients: BTreeMap<String, Arc<dyn Client>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the sub-client `name`.
    pub fn register(&mut self, name: impl Into<String>, client: Arc<dyn Client>) -> &mut Self {
        self.clients.insert(name.into(), client);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.clients.keys().map(String::as_str).collect()
    }

    /// Configured sub-clients in configured order, decorated.
    pub fn resolve(&self, config: &ClientConfig) -> Result<Vec<Arc<dyn Client>>, ConfigError> {
        config
            .subparts
            .iter()
            .map(|name| {
                let client = self
                    .clients
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownClient { name: name.clone() })?;
                decorate(name, client, &config.decorators)
            })
            .collect()
    }
}

impl fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("clients", &self.names())
            .finish()
    }
}
