//! Request driver.
//!
//! [`Agent`] takes a decoded operation, runs it against a shared
//! [`Registry`] and produces the [`Response`]. Decoding and transport are
//! left to the caller.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use snmp_agent_core::handler::RequestContext;
//! use snmp_agent_core::{oid, Agent, Pdu, Registry, Version};
//!
//! let registry = Arc::new(Registry::new());
//! let agent = Agent::builder().registry(registry.clone()).build();
//!
//! let pdu = Pdu::get(1, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]);
//! let ctx = RequestContext::new(Version::V2c).with_security_name("public");
//! let response = agent.process(ctx, pdu).unwrap();
//! assert_eq!(response.varbinds.len(), 1);
//! ```

mod pending;
mod read_handler;
mod set_handler;

use std::sync::Arc;
use std::time::Duration;

use crate::access::{AccessControl, AllowAll, ViewKind};
use crate::error::{Error, Result};
use crate::handler::{ManagedObject, RequestContext, Response};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::registry::{LockOutcome, LockOwner, Registry};
use crate::request::Request;

pub use pending::{PendingGuard, PendingRequests};

/// Default time to wait for an object lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Default response size budget: the largest UDP payload over IPv4.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 65_507;

/// Default cap on variable bindings per request.
pub const DEFAULT_MAX_VARBINDS: usize = 2048;

/// Default time after which an unfinished request stops blocking
/// retransmissions.
pub const DEFAULT_PENDING_MATURITY: Duration = Duration::from_secs(300);

/// Agent tuning.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Time to wait for an object lock (default: 5s). Zero waits forever.
    pub lock_timeout: Duration,
    /// Response size budget in octets when the caller gives none
    /// (default: 65507).
    pub max_response_size: usize,
    /// Maximum variable bindings accepted per request (default: 2048).
    pub max_varbinds: usize,
    /// Lifetime of in-flight request entries (default: 5 minutes).
    pub pending_maturity: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            max_varbinds: DEFAULT_MAX_VARBINDS,
            pending_maturity: DEFAULT_PENDING_MATURITY,
        }
    }
}

/// Builder for [`Agent`].
pub struct AgentBuilder {
    registry: Option<Arc<Registry>>,
    access: Arc<dyn AccessControl>,
    config: AgentConfig,
}

impl AgentBuilder {
    /// Create a builder with default settings, an empty registry and no
    /// access restrictions.
    pub fn new() -> Self {
        Self {
            registry: None,
            access: Arc::new(AllowAll),
            config: AgentConfig::default(),
        }
    }

    /// Serve objects from `registry`.
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Check every addressed OID with `access`.
    pub fn access_control(mut self, access: impl AccessControl) -> Self {
        self.access = Arc::new(access);
        self
    }

    /// Set the lock timeout (zero waits forever).
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout = timeout;
        self
    }

    /// Set the default response size budget.
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.config.max_response_size = size;
        self
    }

    /// Set the maximum variable bindings per request.
    pub fn max_varbinds(mut self, max: usize) -> Self {
        self.config.max_varbinds = max;
        self
    }

    /// Set the lifetime of in-flight request entries.
    pub fn pending_maturity(mut self, maturity: Duration) -> Self {
        self.config.pending_maturity = maturity;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the agent.
    pub fn build(self) -> Agent {
        let pending = PendingRequests::new(self.config.pending_maturity);
        Agent {
            inner: Arc::new(AgentInner {
                registry: self.registry.unwrap_or_default(),
                access: self.access,
                config: self.config,
                pending,
            }),
        }
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives requests against a registry.
///
/// Cheap to clone; clones share the registry and in-flight tracking.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

struct AgentInner {
    registry: Arc<Registry>,
    access: Arc<dyn AccessControl>,
    config: AgentConfig,
    pending: PendingRequests,
}

impl Agent {
    /// Create a builder.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// The registry requests are served from.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    /// Current configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.inner.config
    }

    /// Requests currently in progress.
    pub fn pending(&self) -> &PendingRequests {
        &self.inner.pending
    }

    /// Process `pdu` with the configured response size budget.
    ///
    /// Blocks the calling thread while waiting for object locks; use
    /// [`process_async`](Agent::process_async) from async code.
    pub fn process(&self, ctx: RequestContext, pdu: Pdu) -> Result<Response> {
        self.process_with_limit(ctx, pdu, self.inner.config.max_response_size)
    }

    /// Process `pdu` whose response must fit in `max_size` octets.
    ///
    /// Fails without touching any object if the request carries too many
    /// variable bindings, addresses an unsupported context, or duplicates a
    /// request still in progress. Everything else is reported in the
    /// response.
    pub fn process_with_limit(
        &self,
        ctx: RequestContext,
        pdu: Pdu,
        max_size: usize,
    ) -> Result<Response> {
        let max = self.inner.config.max_varbinds;
        if pdu.varbinds.len() > max {
            return Err(Error::TooManyVarbinds {
                count: pdu.varbinds.len(),
                max,
            });
        }
        if !self
            .inner
            .registry
            .is_context_supported(ctx.context.as_deref())
        {
            tracing::debug!(
                snmp.request_id = pdu.request_id,
                snmp.context = %String::from_utf8_lossy(ctx.context.as_deref().unwrap_or_default()),
                "unsupported context"
            );
            return Err(Error::UnknownContext {
                context: ctx.context.unwrap_or_default(),
            });
        }

        let _pending = self
            .inner
            .pending
            .begin(ctx.security_name.clone(), pdu.request_id)?;

        let mut request = Request::new(ctx, pdu, max_size);
        self.process_request(&mut request);
        let response = request.response();

        tracing::debug!(
            snmp.request_id = response.request_id,
            snmp.transaction_id = request.transaction_id(),
            snmp.error_status = %response.error_status,
            snmp.error_index = response.error_index,
            snmp.varbind_count = response.varbinds.len(),
            "processed request"
        );
        Ok(response)
    }

    /// [`process`](Agent::process) on tokio's blocking pool.
    pub async fn process_async(&self, ctx: RequestContext, pdu: Pdu) -> Result<Response> {
        let agent = self.clone();
        tokio::task::spawn_blocking(move || agent.process(ctx, pdu))
            .await
            .map_err(|e| Error::Worker {
                message: e.to_string(),
            })?
    }

    /// Drive an already created request through all its phases.
    ///
    /// The caller assembles the result with [`Request::response`].
    pub fn process_request(&self, request: &mut Request) {
        match request.pdu_type() {
            PduType::Set => self.handle_set(request),
            _ => self.handle_read(request),
        }
    }

    fn allowed(&self, ctx: &RequestContext, kind: ViewKind, oid: &Oid) -> bool {
        self.inner.access.allowed(
            ctx.context.as_ref(),
            &ctx.security_name,
            ctx.security_model,
            ctx.security_level,
            kind,
            oid,
        )
    }

    fn lock_object(&self, ctx: &RequestContext, object: &dyn ManagedObject) -> bool {
        let owner = LockOwner(ctx.transaction_id);
        match self
            .inner
            .registry
            .lock_with_outcome(owner, object, self.inner.config.lock_timeout)
        {
            LockOutcome::Acquired => true,
            LockOutcome::TimedOut => {
                tracing::debug!(
                    snmp.request_id = ctx.request_id,
                    snmp.lock_owner = %owner,
                    "timed out waiting for object lock"
                );
                false
            }
            LockOutcome::Interrupted => {
                tracing::warn!(
                    snmp.request_id = ctx.request_id,
                    snmp.lock_owner = %owner,
                    "object lock wait interrupted"
                );
                false
            }
        }
    }

    fn unlock_object(&self, ctx: &RequestContext, object: &dyn ManagedObject) {
        self.inner
            .registry
            .unlock(LockOwner(ctx.transaction_id), object);
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("registry", &self.inner.registry)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
