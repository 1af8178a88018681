//! Handler logic trait.
//!
//! The [`HandlerLogic`] trait is the business function wrapped by the
//! pipeline: a function of `(event, context)` to a JSON result.

use crate::{ClientError, HandlerError, InvocationContext, InvocationEvent};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

/// A boxed future, used wherever hooks or logic are stored behind `dyn`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The business logic wrapped by a handler.
///
/// Any async closure of `(InvocationEvent, InvocationContext)` returning
/// `Result<Value, HandlerError>` implements this trait.
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use stagehand_core::{HandlerError, HandlerLogic, InvocationContext, InvocationEvent};
///
/// async fn greet(event: InvocationEvent, _ctx: InvocationContext) -> Result<Value, HandlerError> {
///     let name = event.get("name").and_then(Value::as_str).unwrap_or("world");
///     Ok(json!({ "greeting": format!("hello {name}") }))
/// }
///
/// fn assert_logic<L: HandlerLogic>(_: &L) {}
/// assert_logic(&greet);
/// ```
pub trait HandlerLogic: Send + Sync + 'static {
    /// Runs the logic for one invocation.
    fn call(
        &self,
        event: InvocationEvent,
        context: InvocationContext,
    ) -> BoxFuture<'static, Result<Value, HandlerError>>;
}

impl<F, Fut> HandlerLogic for F
where
    F: Fn(InvocationEvent, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    fn call(
        &self,
        event: InvocationEvent,
        context: InvocationContext,
    ) -> BoxFuture<'static, Result<Value, HandlerError>> {
        Box::pin((self)(event, context))
    }
}

/// Logic over typed input and output, created by [`typed`].
pub struct Typed<F, I, O> {
    func: F,
    _phantom: PhantomData<fn(I) -> O>,
}

/// Adapts a function over typed input and output into [`HandlerLogic`].
///
/// An event that does not deserialize into `I` is the caller's fault and
/// yields a [`ClientError`]; an output that fails to serialize is a
/// service failure.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use stagehand_core::{typed, HandlerError, HandlerLogic, InvocationContext};
///
/// #[derive(Deserialize)]
/// struct Order { sku: String }
///
/// #[derive(Serialize)]
/// struct Receipt { sku: String, accepted: bool }
///
/// let logic = typed(|order: Order, _ctx: InvocationContext| async move {
///     Ok::<_, HandlerError>(Receipt { sku: order.sku, accepted: true })
/// });
///
/// fn assert_logic<L: HandlerLogic>(_: &L) {}
/// assert_logic(&logic);
/// ```
pub fn typed<F, I, O, Fut>(func: F) -> Typed<F, I, O>
where
    F: Fn(I, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    Typed {
        func,
        _phantom: PhantomData,
    }
}

impl<F, I, O, Fut> HandlerLogic for Typed<F, I, O>
where
    F: Fn(I, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    fn call(
        &self,
        event: InvocationEvent,
        context: InvocationContext,
    ) -> BoxFuture<'static, Result<Value, HandlerError>> {
        let input = match serde_json::from_value::<I>(event.into_value()) {
            Ok(input) => input,
            Err(err) => {
                let error = ClientError::new(format!("event does not match expected shape: {err}"));
                return Box::pin(async move { Err(error.into()) });
            }
        };
        let future = (self.func)(input, context);
        Box::pin(async move {
            let output = future.await?;
            serde_json::to_value(output).map_err(HandlerError::service)
        })
    }
}
