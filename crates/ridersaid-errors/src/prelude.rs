//! Prelude module for convenient error handling imports.

pub use crate::{
    Result,
    access::AccessError,
    common::{ErrorContext, ErrorKind, ErrorSeverity, ResultExt, RidersAidError},
    store::StoreError,
    validation::ValidationError,
};

/// Macro for creating an error context.
///
/// # Example
///
/// ```
/// use ridersaid_errors::error_context;
///
/// let ctx = error_context!("delete_record", "collection" => "allergies");
/// assert!(ctx.to_string().contains("allergies"));
/// ```
#[macro_export]
macro_rules! error_context {
    ($operation:expr, $($key:expr => $value:expr),* $(,)?) => {
        {
            let mut ctx = $crate::ErrorContext::new($operation);
            $(
                ctx = ctx.with($key, $value);
            )*
            ctx
        }
    };
}
