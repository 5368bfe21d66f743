// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Opaque request/response surface of the tree data provider.
///
/// Implementations resolve a wire command name plus JSON arguments into a JSON
/// response. Decoding into typed values happens in [`crate::DataClient`].
///
/// The trait is `?Send`: providers are driven from the single UI thread.
#[async_trait(?Send)]
pub trait Backend {
    /// Issue one request. `args` is [`Value::Null`] for argument-less commands.
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, TransportError>;
}

#[async_trait(?Send)]
impl<B: Backend + ?Sized> Backend for Rc<B> {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, TransportError> {
        (**self).invoke(command, args).await
    }
}

#[async_trait(?Send)]
impl<B: Backend + ?Sized> Backend for Box<B> {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, TransportError> {
        (**self).invoke(command, args).await
    }
}
