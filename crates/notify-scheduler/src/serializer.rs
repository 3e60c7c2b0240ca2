//! Payload serialization keyed by payload type.
//!
//! Jobs carry typed payloads; the store only holds bytes. The registry maps
//! each payload type to the serializer that converts it, so the scheduler
//! and dispatcher can stay generic over payload types.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::SchedulerError;

/// Converts a payload type to and from stored bytes.
pub trait PayloadSerializer<P>: Send + Sync {
    /// Serialize a payload for storage.
    fn serialize(&self, payload: &P) -> Result<Vec<u8>, SchedulerError>;

    /// Restore a payload from stored bytes.
    fn deserialize(&self, bytes: &[u8]) -> Result<P, SchedulerError>;
}

/// JSON serializer for any serde payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl<P> PayloadSerializer<P> for JsonSerializer
where
    P: Serialize + DeserializeOwned,
{
    fn serialize(&self, payload: &P) -> Result<Vec<u8>, SchedulerError> {
        serde_json::to_vec(payload).map_err(|e| SchedulerError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<P, SchedulerError> {
        serde_json::from_slice(bytes).map_err(|e| SchedulerError::Serialization(e.to_string()))
    }
}

/// Registry of payload serializers, keyed by payload type.
///
/// Built once at start-up and shared read-only afterwards.
#[derive(Default)]
pub struct SerializerRegistry {
    serializers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl SerializerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the serializer for payload type `P`, replacing any previous one.
    pub fn register<P: 'static>(&mut self, serializer: Arc<dyn PayloadSerializer<P>>) {
        self.serializers
            .insert(TypeId::of::<P>(), Box::new(serializer));
    }

    /// Register `JsonSerializer` for payload type `P`.
    pub fn register_json<P>(&mut self)
    where
        P: Serialize + DeserializeOwned + 'static,
    {
        self.register::<P>(Arc::new(JsonSerializer));
    }

    /// Builder form of `register_json`.
    pub fn with_json<P>(mut self) -> Self
    where
        P: Serialize + DeserializeOwned + 'static,
    {
        self.register_json::<P>();
        self
    }

    /// Look up the serializer for payload type `P`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::NoSerializer` if nothing is registered for `P`.
    pub fn get<P: 'static>(&self) -> Result<Arc<dyn PayloadSerializer<P>>, SchedulerError> {
        self.serializers
            .get(&TypeId::of::<P>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn PayloadSerializer<P>>>())
            .cloned()
            .ok_or(SchedulerError::NoSerializer(type_name::<P>()))
    }

    /// Check if a serializer is registered for payload type `P`.
    pub fn contains<P: 'static>(&self) -> bool {
        self.serializers.contains_key(&TypeId::of::<P>())
    }
}
