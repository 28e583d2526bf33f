// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interception and monitoring
//!
//! Every asynchronous request a page issues passes through an
//! [`InterceptorChain`]; the CSRF injector is one such interceptor.

mod csrf;
mod event;
mod interceptor;
mod interceptor_trait;

pub use csrf::{
    is_safe_method, is_same_origin, CsrfConfig, CsrfHeaderInjector, DocumentOrigin, MISSING_TOKEN,
};
pub use event::{EventType, NetworkEvent, RequestInfo, ResponseInfo};
pub use interceptor::NetworkInterceptor;
pub use interceptor_trait::{InterceptAction, InterceptorChain, RequestInterceptor, RequestLogger};
