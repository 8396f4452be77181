//! Secret string types.
//!
//! All three types are opaque: they never show their value in Debug output
//! and expose it only through `as_str` for building requests.

use std::fmt;

macro_rules! secret_string {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            /// Wrap a secret value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the secret value.
            ///
            /// # Security
            ///
            /// Use only when constructing requests or persisting the session.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&"[REDACTED]").finish()
            }
        }
    };
}

secret_string!(
    /// A short-lived token authorizing requests on behalf of the signed-in user.
    AccessToken
);

secret_string!(
    /// A longer-lived token used to obtain a new access token.
    RefreshToken
);

secret_string!(
    /// The gateway's public API key, sent with every request.
    ApiKey
);
