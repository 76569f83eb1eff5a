/// Gallery viewer window
/// Shows a rendered gallery as a grid of tiles with their captions
use iced::widget::{button, column, container, image, row, scrollable, text, Column, Row};
use iced::{Alignment, Color, Element, Length, Task, Theme};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use sample_gallery::{show_gallery, Dataset, Frame, Gallery, GalleryOptions};

/// Screen pixels per inch used to size cells on screen
const SCREEN_DPI: f32 = 96.0;

const MISTAKE_TEXT: Color = Color::from_rgb(1.0, 0.0, 0.0);

/// A tile converted for display
#[derive(Debug, Clone)]
struct TileView {
    handle: image::Handle,
    caption: Option<String>,
    mistake: bool,
}

/// Everything the window needs from a rendered gallery
#[derive(Debug, Clone)]
struct GalleryView {
    tiles: Vec<TileView>,
    columns: usize,
    /// On-screen cell edge
    cell: f32,
}

impl GalleryView {
    fn from_gallery(gallery: Gallery) -> Self {
        let columns = gallery.grid.columns;
        let cell = gallery.grid.cell_inches * SCREEN_DPI;

        let tiles = gallery
            .tiles
            .into_iter()
            .map(|tile| {
                let (width, height) = tile.image.dimensions();
                TileView {
                    handle: image::Handle::from_rgba(width, height, tile.image.into_raw()),
                    caption: tile.caption,
                    mistake: tile.frame == Frame::Mistake,
                }
            })
            .collect();

        Self { tiles, columns, cell }
    }
}

/// Viewer application state
struct GalleryViewer {
    dataset: Arc<Dataset>,
    options: GalleryOptions,
    rng: StdRng,
    gallery: Option<GalleryView>,
    loading: bool,
    /// Status message to display to the user
    status: String,
}

/// Viewer messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Draw a new random sample
    Shuffle,
    /// Background rendering finished
    Loaded(Result<Option<GalleryView>, String>),
}

impl GalleryViewer {
    fn new(dataset: Dataset, options: GalleryOptions, rng: StdRng) -> (Self, Task<Message>) {
        let mut viewer = GalleryViewer {
            dataset: Arc::new(dataset),
            options,
            rng,
            gallery: None,
            loading: false,
            status: String::new(),
        };
        let task = viewer.reload();
        (viewer, task)
    }

    /// Start rendering on a blocking worker so the window stays responsive
    fn reload(&mut self) -> Task<Message> {
        self.loading = true;
        self.status = format!("Rendering {} samples...", self.dataset.len());

        let seed = self.rng.gen();
        Task::perform(
            load_gallery_async(self.dataset.clone(), self.options, seed),
            Message::Loaded,
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Shuffle => self.reload(),
            Message::Loaded(result) => {
                self.loading = false;
                match result {
                    Ok(Some(gallery)) => {
                        self.status = format!("Showing {} images", gallery.tiles.len());
                        self.gallery = Some(gallery);
                    }
                    Ok(None) => {
                        self.status = sample_gallery::gallery::EMPTY_MESSAGE.to_string();
                        self.gallery = None;
                    }
                    Err(e) => {
                        tracing::error!("Gallery rendering failed: {}", e);
                        self.status = format!("❌ {}", e);
                        self.gallery = None;
                    }
                }
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<Message> {
        let can_shuffle = self.options.randomize && !self.loading;
        let header = row![
            text(&self.status).size(16),
            button("Shuffle")
                .on_press_maybe(can_shuffle.then_some(Message::Shuffle))
                .padding(8),
        ]
        .spacing(20)
        .align_y(Alignment::Center);

        let mut content: Column<Message> = column![header].spacing(20).padding(20);

        if let Some(gallery) = &self.gallery {
            content = content.push(scrollable(grid(gallery)));
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn grid(gallery: &GalleryView) -> Element<'_, Message> {
    let mut rows = Column::new().spacing(12);

    for chunk in gallery.tiles.chunks(gallery.columns.max(1)) {
        let mut line = Row::new().spacing(12);
        for tile in chunk {
            let mut cell = Column::new()
                .width(Length::Fixed(gallery.cell))
                .spacing(4)
                .align_x(Alignment::Center)
                .push(
                    image(tile.handle.clone())
                        .width(Length::Fixed(gallery.cell))
                        .height(Length::Fixed(gallery.cell)),
                );

            if let Some(caption) = &tile.caption {
                let mut label = text(caption.as_str()).size(12);
                if tile.mistake {
                    label = label.color(MISTAKE_TEXT);
                }
                cell = cell.push(label);
            }

            line = line.push(cell);
        }
        rows = rows.push(line);
    }

    rows.into()
}

/// Render the gallery off the UI thread
async fn load_gallery_async(
    dataset: Arc<Dataset>,
    options: GalleryOptions,
    seed: u64,
) -> Result<Option<GalleryView>, String> {
    tokio::task::spawn_blocking(move || {
        let mut rng = StdRng::seed_from_u64(seed);
        show_gallery(&dataset, &options, &mut rng)
            .map(|gallery| gallery.map(GalleryView::from_gallery))
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}

/// Open the viewer window and block until it is closed
pub fn run(dataset: Dataset, options: GalleryOptions, rng: StdRng) -> iced::Result {
    iced::application("Sample Gallery", GalleryViewer::update, GalleryViewer::view)
        .theme(GalleryViewer::theme)
        .centered()
        .run_with(move || GalleryViewer::new(dataset, options, rng))
}
