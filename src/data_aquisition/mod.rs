/*
 * This module provides data aquisition abilites for the application.
 * It opens CLI sessions to routers and returns command output, raw or structured.
 * New transports implement `DeviceConnector`/`DeviceSession` from `core`.
 */

pub mod core;
pub mod ssh;
