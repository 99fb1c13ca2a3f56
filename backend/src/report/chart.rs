//! Average-age bar chart rendered with plotters.
//!
//! Each chart is a self-contained [`BarChart`] value: the dataset, labels and
//! size travel with it and [`BarChart::render`] draws onto a fresh bitmap.
//!
//! Text needs a TrueType/OpenType font. One is registered per process from the
//! configured path or a list of common system locations; without one the chart
//! cannot be labelled and rendering fails.

use once_cell::sync::OnceCell;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::{OutputError, OutputResult};
use crate::logs::{log_info, log_warning};
use super::aggregate::CityAverages;

const FONT_FAMILY: &str = "sans-serif";

/// Bar fill, matplotlib's "green".
const BAR_FILL: RGBColor = RGBColor(0, 128, 0);

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static CHART_FONT: OnceCell<Option<PathBuf>> = OnceCell::new();

/// Register the chart font, once per process.
///
/// `preferred` is tried before the system locations. Only the first call
/// decides; later calls return the same answer.
pub fn ensure_font(preferred: Option<&Path>) -> Option<&'static Path> {
    CHART_FONT
        .get_or_init(|| {
            let candidates = preferred
                .map(Path::to_path_buf)
                .into_iter()
                .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

            let found = register_first(candidates);
            match &found {
                Some(path) => log_info(format!("Chart font: {}", path.display())),
                None => log_warning("No usable font found; charts cannot be rendered"),
            }
            found
        })
        .as_deref()
}

/// Register the first readable, parseable font among `candidates`.
fn register_first(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
            return Some(path);
        }
        log_warning(format!("Not a usable font: {}", path.display()));
    }
    None
}

/// A vertical bar chart with one labelled bar per category.
#[derive(Debug, Clone)]
pub struct BarChart {
    title: String,
    x_desc: String,
    y_desc: String,
    bars: Vec<(String, i64)>,
    size: (u32, u32),
    font: Option<PathBuf>,
}

impl BarChart {
    pub fn new(title: impl Into<String>, bars: Vec<(String, i64)>) -> Self {
        Self {
            title: title.into(),
            x_desc: String::new(),
            y_desc: String::new(),
            bars,
            size: (1024, 768),
            font: None,
        }
    }

    /// Chart of rounded average age per city, cities in report order.
    pub fn average_age(averages: &CityAverages) -> Self {
        let bars = averages.iter().map(|(city, age)| (city.clone(), *age)).collect();
        Self::new("Average Age by City", bars).with_axes("City", "Average Age (Years)")
    }

    pub fn with_axes(mut self, x_desc: impl Into<String>, y_desc: impl Into<String>) -> Self {
        self.x_desc = x_desc.into();
        self.y_desc = y_desc.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_font(mut self, font: Option<PathBuf>) -> Self {
        self.font = font;
        self
    }

    pub fn bars(&self) -> &[(String, i64)] {
        &self.bars
    }

    /// Upper bound of the value axis: tallest bar plus 10%, at least 1.
    pub fn y_max(&self) -> i64 {
        let tallest = self.bars.iter().map(|(_, v)| *v).max().unwrap_or(0).max(0);
        ((tallest as f64 * 1.1).ceil() as i64).max(1)
    }

    /// Draw the chart as an image at `path`; the extension picks the format.
    pub fn render(&self, path: &Path) -> OutputResult<()> {
        let fail = |e: &dyn Display| OutputError::Chart {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if ensure_font(self.font.as_deref()).is_none() {
            return Err(fail(&"no usable font for chart labels (set --font or CENSUS_CHART_FONT)"));
        }

        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| fail(&e))?;

        let slots = self.bars.len().max(1) as u32;
        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(&self.title, (FONT_FAMILY, 28))
            .x_label_area_size(140)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..slots).into_segmented(), 0i64..self.y_max())
            .map_err(|e| fail(&e))?;

        let label_of = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => self
                .bars
                .get(*i as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(self.x_desc.as_str())
            .y_desc(self.y_desc.as_str())
            .x_labels(self.bars.len())
            .x_label_formatter(&label_of)
            .x_label_style((FONT_FAMILY, 14).into_font().transform(FontTransform::Rotate90))
            .y_label_style((FONT_FAMILY, 14))
            .axis_desc_style((FONT_FAMILY, 16))
            .draw()
            .map_err(|e| fail(&e))?;

        chart
            .draw_series(self.bar_shapes(BAR_FILL.filled()))
            .map_err(|e| fail(&e))?;
        chart
            .draw_series(self.bar_shapes(BLACK.stroke_width(1)))
            .map_err(|e| fail(&e))?;

        root.present().map_err(|e| fail(&e))?;
        Ok(())
    }

    fn bar_shapes(
        &self,
        style: ShapeStyle,
    ) -> impl Iterator<Item = Rectangle<(SegmentValue<u32>, i64)>> + '_ {
        self.bars.iter().enumerate().map(move |(i, (_, value))| {
            let i = i as u32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), *value)],
                style,
            );
            bar.set_margin(0, 0, 8, 8);
            bar
        })
    }
}
