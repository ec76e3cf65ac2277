use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::models::{Dataset, TripRecord, UserProfile};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Login,
    Register,
    MainMenu,
    Corridor,
    History,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Login => "login",
            Page::Register => "register",
            Page::MainMenu => "main_menu",
            Page::Corridor => "corridor",
            Page::History => "history",
        };
        f.write_str(name)
    }
}

/// Everything one browser session knows. The trip table is shared with every
/// other session; `users` is this session's own working copy, so profiles
/// registered here stay invisible to other sessions.
#[derive(Clone, Debug)]
pub struct SessionState {
    page: Page,
    user_id: Option<String>,
    pub users: Vec<UserProfile>,
    pub trips: Arc<[TripRecord]>,
}

impl SessionState {
    pub fn new(dataset: &Dataset) -> Self {
        SessionState {
            page: Page::Login,
            user_id: None,
            users: dataset.users.clone(),
            trips: Arc::clone(&dataset.trips),
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn go_to(&mut self, page: Page) {
        tracing::debug!("page {} -> {}", self.page, page);
        self.page = page;
    }

    pub fn sign_in(&mut self, pay_user_id: String) {
        self.user_id = Some(pay_user_id);
    }

    pub fn sign_out(&mut self) {
        self.user_id = None;
    }

    pub fn find_user(&self, pay_user_id: &str) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.pay_user_id == pay_user_id)
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.user_id().and_then(|id| self.find_user(id))
    }
}
