// ares-fabric/src/lib.rs
// ============================================================================
// Module: ARES Fabric Library
// Description: In-process event fan-out for ARES observers.
// Purpose: Deliver core events to subscribers with bounded queues.
// Dependencies: ares-core, tokio
// ============================================================================

//! ## Overview
//! ARES Fabric provides the in-process pub/sub used for real-time fan-out:
//! pattern subscriptions, bounded per-subscriber queues, drop accounting for
//! slow consumers, and synchronous unsubscribe. External transports convert
//! fabric events into wire frames; durability is layered above, not here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod fabric;
pub mod pattern;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use fabric::EventFabric;
pub use fabric::SubscriptionHandle;
pub use pattern::PatternError;
pub use pattern::TopicPattern;
