//! HTTP request pipeline: descriptors, execution, transformation, and
//! the dual await/callback result future.

pub mod client;
pub mod error;
pub mod listenable;
pub mod request;
pub mod transformer;

pub use client::HttpClient;
pub use error::ApiError;
pub use listenable::{Listenable, Outcome};
pub use request::{Method, Request, RequestBuilder};
pub use transformer::{EmptyTransformer, RawResponse, Transform, ValueTransformer};
