#![deny(rust_2018_idioms)]

pub mod app;
pub mod domain;
pub mod form;
pub mod io;
pub mod presentation;

pub use app::{Explorer, Invoker, LoopbackInvoker, UiOptions};
pub use domain::{Catalog, SchemaNode, SchemaProvider};

pub mod prelude {
    pub use super::{
        Catalog, Explorer, Invoker, LoopbackInvoker, SchemaNode, SchemaProvider, UiOptions,
        app::{FormController, FormEvent, FormPhase, InvokeError},
        io::DocumentFormat,
    };
}
