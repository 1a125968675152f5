// SPDX-License-Identifier: MPL-2.0

//! Backends the recorder consumes frames from

pub mod sensor;
