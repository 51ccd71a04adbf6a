// Copyright 2025 The Suzaku CLI Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Commands of the Suzaku CLI, one module per protocol component.

pub mod balancer;
pub mod delegator;
pub mod keystore;
pub mod l1;
pub mod middleware;
pub mod operator;
pub mod opt_in;
pub mod pchain;
pub mod rewards;
pub mod uptime;
pub mod vault;
pub mod vault_manager;
