// /////////////////////////////////////////////////////////////////////////////
// Kiara
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Built-in adapters
//!
//! Concrete `DataType` implementations for the value types every kiara
//! context registers out of the box.

pub mod data_types;

pub use data_types::{AnyType, BooleanType, FloatType, IntegerType, ListType, StringType};
