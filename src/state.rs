// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stowgate Contributors

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let auth = AuthService::from_settings(&settings);
        Self {
            settings: Arc::new(settings),
            auth,
        }
    }
}
