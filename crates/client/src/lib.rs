//! Client-side access layer for versioned, selector-based ad-management APIs.
//!
//! The pieces compose in a fixed order:
//!
//! 1. [`config::ClientConfig`] carries credentials and connection settings,
//!    loaded from environment variables or a config file.
//! 2. [`session::Session`] is the immutable bundle of endpoint, API version,
//!    network scoping, and a token provider.
//! 3. [`service::ServiceFactory`] resolves a [`service::ServiceDescriptor`]
//!    against the static registry and hands back a [`service::ServiceProxy`]
//!    without touching the network.
//! 4. The proxy executes `get`/`query`/`mutate` calls with bearer
//!    authentication, bounded retries for transient failures, and a single
//!    refresh-and-retry when the server rejects a stale token.
//! 5. [`paging::QueryPager`] walks large result sets page by page, and
//!    [`mutate::BatchMutator`] chunks large operation lists while keeping
//!    results aligned with their inputs.
//!
//! # Example
//!
//! ```rust,ignore
//! use adflux_client::config::ClientConfig;
//! use adflux_client::service::{ServiceDescriptor, ServiceFactory};
//! use adflux_client::selector::Selector;
//! use adflux_client::session::Session;
//!
//! let config = ClientConfig::load()?;
//! let session = Session::from_config(&config)?;
//! let factory = ServiceFactory::new(session);
//!
//! let proxy = factory.service(&ServiceDescriptor::new("CampaignService", "v202408"))?;
//! let selector = Selector::builder().fields(["id", "name", "status"]).build();
//! let page: Page<Campaign> = proxy.get(&selector).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod awql;
pub mod config;
pub mod error;
pub mod http;
pub mod mutate;
pub mod paging;
pub mod selector;
pub mod service;
pub mod session;

pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorReason, ApiException, ClientError, ClientResult};
pub use mutate::{BatchMutator, BatchResult, Operation, OperationResult, Operator};
pub use paging::QueryPager;
pub use selector::{Page, Predicate, PredicateOperator, Selector, SortOrder};
pub use service::{ServiceDescriptor, ServiceFactory, ServiceProxy, ServiceRegistry};
pub use session::{Session, SessionBuilder};
