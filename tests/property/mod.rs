// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! This module contains property-based tests using proptest to verify the
//! consistency rules of the configuration store under arbitrary edits.

mod invariants;
