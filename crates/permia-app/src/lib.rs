// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod deferred;
pub mod edit;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod model;
pub mod pagination;
pub mod record;
pub mod schema;
pub mod state;
pub mod store;

pub use controller::*;
pub use deferred::*;
pub use edit::*;
pub use filter::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use pagination::*;
pub use record::*;
pub use schema::*;
pub use state::*;
pub use store::*;
