// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod backend;
pub mod ids;
pub mod model;
pub mod selection;
pub mod session;
pub mod state;
pub mod store;
pub mod view;
pub mod vin;

pub use backend::*;
pub use ids::*;
pub use model::*;
pub use selection::*;
pub use session::*;
pub use state::*;
pub use store::*;
pub use view::*;
pub use vin::*;
