/// One-line audio diagnostic shown to the user.
///
/// Hosts decide how to display it: the native window puts it in the title
/// bar, the web page reads it through the wasm bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioStatus {
    message: Option<String>,
}

impl AudioStatus {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn hide(&mut self) {
        self.message = None;
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_and_hide() {
        let mut status = AudioStatus::default();
        assert!(!status.is_visible());
        status.show("Audio files missing for park");
        assert_eq!(status.message(), Some("Audio files missing for park"));
        status.hide();
        assert_eq!(status.message(), None);
    }
}
