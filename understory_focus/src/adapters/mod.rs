// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapters that build [`FocusSpace`](crate::FocusSpace)s from concrete trees.

pub mod entity_tree;
