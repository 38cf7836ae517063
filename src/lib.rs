//! # emucleaner
//!
//! Inventory and clean Android emulators, virtual devices and connected
//! devices over adb.
//!
//! - **Device inventory**: connected devices with model, Android version and storage
//! - **Virtual devices**: on-disk AVDs with total, snapshot and cache sizes
//! - **Safe cleanup**: running emulators are re-checked and refused before any deletion
//! - **Risk-tagged catalog**: app caches, temp files, logs, downloads and more
//! - **Per-item isolation**: one failed action or uninstall never stops a batch

pub mod adb;
pub mod avd;
pub mod cleaner;
pub mod cli;
pub mod common;
