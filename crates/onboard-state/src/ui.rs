//! Transient presentation state kept next to the record: which dropdown
//! is open, which channel's OTP modal is showing, and the last notice.

use serde::{Deserialize, Serialize};

use onboard_core::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Menu {
    BusinessType,
    ProductTypes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Error,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// At most one menu and one modal are open at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UiState {
    pub open_menu: Option<Menu>,
    pub otp_modal: Option<Channel>,
    pub notice: Option<Notice>,
}

impl UiState {
    /// Open `menu`, closing any other, or close it if it is already open.
    pub fn toggle_menu(&mut self, menu: Menu) {
        self.open_menu = if self.open_menu == Some(menu) {
            None
        } else {
            Some(menu)
        };
    }

    pub fn close_menus(&mut self) {
        self.open_menu = None;
    }

    /// Show the modal for `channel`. Returns the channel whose modal was
    /// replaced, if any.
    pub fn open_otp(&mut self, channel: Channel) -> Option<Channel> {
        self.open_menu = None;
        self.otp_modal.replace(channel).filter(|c| *c != channel)
    }

    pub fn close_otp(&mut self) -> Option<Channel> {
        self.otp_modal.take()
    }

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_menu_open() {
        let mut ui = UiState::default();
        ui.toggle_menu(Menu::BusinessType);
        ui.toggle_menu(Menu::ProductTypes);
        assert_eq!(ui.open_menu, Some(Menu::ProductTypes));
        ui.toggle_menu(Menu::ProductTypes);
        assert_eq!(ui.open_menu, None);
    }

    #[test]
    fn opening_modal_closes_menu_and_reports_replaced_channel() {
        let mut ui = UiState::default();
        ui.toggle_menu(Menu::BusinessType);
        assert_eq!(ui.open_otp(Channel::Email), None);
        assert_eq!(ui.open_menu, None);
        assert_eq!(ui.open_otp(Channel::Email), None);
        assert_eq!(ui.open_otp(Channel::Mobile), Some(Channel::Email));
        assert_eq!(ui.close_otp(), Some(Channel::Mobile));
        assert_eq!(ui.close_otp(), None);
    }
}
