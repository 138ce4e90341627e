//! External entity collections referenced by settings
//!
//! A Reference setting stores the primary key of an entity owned by another
//! part of the application (a user, a site, ...). The entity set resolves
//! those keys. The owner of the entities is expected to notify the settings
//! service when an entity is deleted, see `Settings::entity_deleted`.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[async_trait]
pub trait EntitySet: Debug + Send + Sync {
	/// Entity type name, used to route deletion notifications
	fn model(&self) -> &str;

	/// Whether an entity with the given primary key currently exists
	async fn contains(&self, pk: &str) -> DcResult<bool>;
}

// vim: ts=4
