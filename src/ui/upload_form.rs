use iced::widget::{button, column, container, row, text, text_input, Column};
use iced::{Alignment, Element, Length};
use std::path::PathBuf;

use crate::app::Message;

/// Inputs of the upload panel
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UploadForm {
    pub selected: Option<PathBuf>,
    pub description: String,
    /// A read is in flight; the upload button stays disabled until it lands
    pub uploading: bool,
}

impl UploadForm {
    /// Reset the inputs after a successful upload
    pub fn clear(&mut self) {
        self.selected = None;
        self.description.clear();
    }

    pub fn view(&self) -> Element<'_, Message> {
        let file_label = self
            .selected
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "No file chosen".to_string());

        let upload_label = if self.uploading { "Uploading..." } else { "Upload Photo" };

        let content: Column<'_, Message> = column![
            text("Add a new photo to the gallery").size(22),
            text("JPG, PNG, GIF or WebP up to 5 MB | stored only on this computer").size(14),
            row![
                button("Choose File...").on_press(Message::ChooseFile),
                text(file_label).size(14),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
            text_input("Write a description for this photo...", &self.description)
                .on_input(Message::DescriptionChanged)
                .on_submit(Message::Upload)
                .padding(12)
                .size(16),
            row![
                button(upload_label)
                    .on_press_maybe((!self.uploading).then_some(Message::Upload))
                    .padding([12, 30]),
                button("Clear All")
                    .style(button::danger)
                    .on_press(Message::ClearAll)
                    .padding([12, 20]),
            ]
            .spacing(10),
        ]
        .spacing(15)
        .max_width(500)
        .align_x(Alignment::Center);

        container(content)
            .padding(25)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .style(container::bordered_box)
            .into()
    }
}
