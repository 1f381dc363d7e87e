//! Error type shared by every stage of a dispatch.

use hipstr::HipStr;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Boxed error usable as a `source` across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Context attached to errors raised while resolving a subscription.
pub const LOOKUP_CONTEXT: &str = "subscription_lookup";

/// What went wrong, independent of where.
///
/// The string form is `snake_case` and is what appears between brackets in
/// the rendered error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// A record or subscription failed validation.
    InvalidInput,
    /// Startup settings or the subscriptions file are unusable.
    Configuration,
    /// A record or envelope could not be encoded.
    Serialization,
    /// No subscription matches the change.
    NotFound,
    /// The subscription store could not answer.
    ServiceUnavailable,
    /// A local failure unrelated to the endpoint.
    InternalError,
    /// The HTTP request could not be completed.
    NetworkError,
    /// The HTTP request ran past its deadline.
    Timeout,
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Returns whether this kind describes a failure of the outbound transport.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout)
    }
}

/// Classified error with an optional message, context and source.
///
/// Renders as `[kind] context: message`, leaving out the parts that are unset.
#[must_use]
#[derive(Debug, Error)]
#[error(
    "[{kind}]{}{}",
    context.as_ref().map(|c| format!(" {c}")).unwrap_or_default(),
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<HipStr<'static>>,
    #[source]
    pub source: Option<BoxedError>,
    /// Where the error was raised, e.g. [`LOOKUP_CONTEXT`] or `subscription #3`.
    pub context: Option<HipStr<'static>>,
}

macro_rules! kind_constructors {
    ($($(#[$doc:meta])* $name:ident => $kind:ident;)+) => {
        $(
            $(#[$doc])*
            pub fn $name() -> Self {
                Self::new(ErrorKind::$kind)
            }
        )+
    };
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
            context: None,
        }
    }

    kind_constructors! {
        /// Rejected record or subscription data.
        invalid_input => InvalidInput;
        /// Unusable settings.
        configuration => Configuration;
        /// Encoding failure.
        serialization => Serialization;
        /// Nothing subscribed.
        not_found => NotFound;
        /// Unreachable subscription store.
        service_unavailable => ServiceUnavailable;
        internal_error => InternalError;
        /// Failed HTTP exchange.
        network_error => NetworkError;
        /// Expired HTTP deadline.
        timeout => Timeout;
    }

    pub fn with_message(mut self, message: impl Into<HipStr<'static>>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Records where the error was raised, replacing any earlier context.
    pub fn with_context(mut self, context: impl Into<HipStr<'static>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Sets the context, folding any earlier context into the message.
    pub fn within(mut self, context: impl Into<HipStr<'static>>) -> Self {
        if let Some(inner) = self.context.take() {
            let message = match self.message.take() {
                Some(message) => HipStr::from(format!("{inner}: {message}")),
                None => inner,
            };
            self.message = Some(message);
        }

        self.with_context(context)
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns whether the dispatch stopped because no subscription could be resolved.
    ///
    /// Covers both an empty lookup result and a failing subscription store.
    #[must_use]
    pub fn is_lookup_failure(&self) -> bool {
        self.kind == ErrorKind::NotFound || self.context.as_deref() == Some(LOOKUP_CONTEXT)
    }

    /// Returns whether the outbound HTTP call itself failed.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        self.kind.is_transport()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization()
            .with_message("JSON encoding failed")
            .with_source(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::internal_error()
            .with_message("I/O failure")
            .with_source(error)
    }
}
