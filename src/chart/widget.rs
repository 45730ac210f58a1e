//! Vertical bar chart widget with rotated labels

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use super::{format_value, Bar};

/// Block characters for partial bar tops (eighths of a cell)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Most rows given over to the vertical labels under the axis
const MAX_LABEL_ROWS: u16 = 12;

/// A bar chart drawing one column per bar, labels written top-to-bottom
/// under the x-axis so long currency names stay legible
///
/// When the bars do not fit, the gaps between them go first. If they still do
/// not fit, a window of bars starting at `offset` is drawn and the number of
/// bars left out on either side is shown above the plot.
pub struct RateBarChart<'a> {
    bars: &'a [Bar],
    title: &'a str,
    y_label: &'a str,
    bar_width: u16,
    gap: u16,
    offset: usize,
    bar_style: Style,
    label_style: Style,
    axis_style: Style,
}

/// Where the plot sits inside the widget area
struct PlotLayout {
    plot_x: u16,
    plot_width: u16,
    plot_height: u16,
    axis_y: u16,
    label_rows: u16,
    gap: u16,
    visible: usize,
}

impl<'a> RateBarChart<'a> {
    pub fn new(bars: &'a [Bar]) -> Self {
        Self {
            bars,
            title: "",
            y_label: "",
            bar_width: 1,
            gap: 1,
            offset: 0,
            bar_style: Style::default().fg(Color::Blue),
            label_style: Style::default().fg(Color::Gray),
            axis_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn y_label(mut self, y_label: &'a str) -> Self {
        self.y_label = y_label;
        self
    }

    pub fn bar_width(mut self, width: u16) -> Self {
        self.bar_width = width.max(1);
        self
    }

    pub fn bar_style(mut self, style: Style) -> Self {
        self.bar_style = style;
        self
    }

    /// Index of the first bar drawn when not all of them fit
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }

    /// Gap and number of bars that fit in `width` columns
    fn fit(&self, width: u16) -> (u16, usize) {
        let count = self.bars.len();
        let needed = |gap: u16| {
            count * usize::from(self.bar_width) + count.saturating_sub(1) * usize::from(gap)
        };
        if needed(self.gap) <= usize::from(width) {
            (self.gap, count)
        } else if needed(0) <= usize::from(width) {
            (0, count)
        } else {
            (0, usize::from(width / self.bar_width))
        }
    }

    /// Bar height in eighths of a cell; any positive value gets at least one
    fn bar_eighths(&self, value: f64, max: f64, rows: u16) -> u32 {
        if max <= 0.0 || value <= 0.0 {
            return 0;
        }
        let total = u32::from(rows) * 8;
        ((value / max * f64::from(total)).round() as u32).clamp(1, total)
    }

    fn label_rows(&self, body_height: u16) -> u16 {
        let longest = self
            .bars
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0) as u16;
        longest.min(MAX_LABEL_ROWS).min(body_height / 3)
    }

    fn layout(&self, area: Rect) -> Option<PlotLayout> {
        if area.width < 4 || area.height < 4 {
            return None;
        }
        let body_y = area.y + 2;
        let body_height = area.height - 2;
        let label_rows = self.label_rows(body_height);
        let plot_height = body_height.saturating_sub(label_rows + 1);
        if plot_height == 0 {
            return None;
        }

        let axis_width = format_value(self.max_value()).chars().count() as u16 + 1;
        if axis_width >= area.width {
            return None;
        }
        let plot_width = area.width - axis_width;
        let (gap, visible) = self.fit(plot_width);

        Some(PlotLayout {
            plot_x: area.x + axis_width,
            plot_width,
            plot_height,
            axis_y: body_y + plot_height,
            label_rows,
            gap,
            visible,
        })
    }

    /// Largest offset that still fills the plot when drawn into `area`
    pub fn max_offset(&self, area: Rect) -> usize {
        self.layout(area)
            .map_or(0, |layout| self.bars.len() - layout.visible)
    }
}

impl<'a> Widget for RateBarChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(layout) = self.layout(area) else {
            return;
        };

        let title_x = area.x + area.width.saturating_sub(self.title.chars().count() as u16) / 2;
        buf.set_stringn(
            title_x,
            area.y,
            self.title,
            area.width as usize,
            Style::default().add_modifier(Modifier::BOLD),
        );
        buf.set_stringn(area.x, area.y + 1, self.y_label, area.width as usize, self.label_style);

        let first = self.offset.min(self.bars.len() - layout.visible);
        let after = self.bars.len() - first - layout.visible;
        let marker = match (first, after) {
            (0, 0) => String::new(),
            (0, after) => format!("+{} more ▸", after),
            (first, 0) => format!("◂ {} before", first),
            (first, after) => format!("◂ {} before  +{} more ▸", first, after),
        };
        if !marker.is_empty() {
            let marker_x =
                area.x + area.width.saturating_sub(marker.chars().count() as u16);
            buf.set_stringn(marker_x, area.y + 1, &marker, area.width as usize, self.axis_style);
        }

        let PlotLayout {
            plot_x,
            plot_width,
            plot_height,
            axis_y,
            label_rows,
            gap,
            visible,
        } = layout;
        let max = self.max_value();
        let top_y = axis_y - plot_height;

        // Axes
        buf.set_string(area.x, top_y, format_value(max), self.label_style);
        buf.set_string(area.x, axis_y - 1, "0", self.label_style);
        for y in top_y..axis_y {
            if let Some(cell) = buf.cell_mut((plot_x - 1, y)) {
                cell.set_char('│').set_style(self.axis_style);
            }
        }
        if let Some(cell) = buf.cell_mut((plot_x - 1, axis_y)) {
            cell.set_char('└').set_style(self.axis_style);
        }
        for x in plot_x..plot_x + plot_width {
            if let Some(cell) = buf.cell_mut((x, axis_y)) {
                cell.set_char('─').set_style(self.axis_style);
            }
        }

        for (i, bar) in self.bars[first..first + visible].iter().enumerate() {
            let x = plot_x + i as u16 * (self.bar_width + gap);
            let eighths = self.bar_eighths(bar.value, max, plot_height);

            for row in 0..plot_height {
                let filled = eighths.saturating_sub(u32::from(row) * 8);
                if filled == 0 {
                    break;
                }
                let block = BLOCKS[(filled.min(8) - 1) as usize];
                let y = axis_y - 1 - row;
                for dx in 0..self.bar_width {
                    if let Some(cell) = buf.cell_mut((x + dx, y)) {
                        cell.set_char(block).set_style(self.bar_style);
                    }
                }
            }

            for (row, ch) in bar.label.chars().take(label_rows as usize).enumerate() {
                if let Some(cell) = buf.cell_mut((x, axis_y + 1 + row as u16)) {
                    cell.set_char(ch).set_style(self.label_style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars() -> Vec<Bar> {
        vec![
            Bar::new("USD", 90.5),
            Bar::new("EUR", 98.1),
            Bar::new("JPY", 0.6025),
        ]
    }

    fn render_to_buffer(chart: RateBarChart, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        chart.render(area, &mut buf);
        buf
    }

    /// Columns holding at least one bar block
    fn bar_columns(buf: &Buffer) -> Vec<u16> {
        let area = buf.area;
        (area.x..area.x + area.width)
            .filter(|&x| {
                (area.y..area.y + area.height).any(|y| {
                    buf.cell((x, y))
                        .and_then(|c| c.symbol().chars().next())
                        .is_some_and(|c| BLOCKS.contains(&c))
                })
            })
            .collect()
    }

    #[test]
    fn test_renders_one_column_per_bar() {
        let bars = bars();
        let buf = render_to_buffer(RateBarChart::new(&bars), 40, 20);
        assert_eq!(bar_columns(&buf).len(), 3);
    }

    #[test]
    fn test_wide_bars_take_bar_width_columns() {
        let bars = bars();
        let buf = render_to_buffer(RateBarChart::new(&bars).bar_width(2), 40, 20);
        assert_eq!(bar_columns(&buf).len(), 6);
    }

    #[test]
    fn test_labels_are_written_vertically() {
        let bars = vec![Bar::new("USD", 1.0)];
        let buf = render_to_buffer(RateBarChart::new(&bars), 20, 20);
        let x = bar_columns(&buf)[0];
        let column: String = (0..20)
            .filter_map(|y| buf.cell((x, y)).map(|c| c.symbol().to_string()))
            .collect();
        assert!(column.contains("USD"), "column was {:?}", column);
    }

    #[test]
    fn test_title_is_drawn() {
        let bars = bars();
        let buf = render_to_buffer(RateBarChart::new(&bars).title("Currency Values"), 40, 20);
        let first_row: String = (0..40)
            .filter_map(|x| buf.cell((x, 0)).map(|c| c.symbol().to_string()))
            .collect();
        assert!(first_row.contains("Currency Values"));
    }

    #[test]
    fn test_empty_chart_draws_no_bars() {
        let buf = render_to_buffer(RateBarChart::new(&[]), 40, 20);
        assert!(bar_columns(&buf).is_empty());
    }

    fn many_bars(count: u32) -> Vec<Bar> {
        (0..count)
            .map(|i| Bar::new(format!("Currency {}", i), f64::from(i + 1)))
            .collect()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
            .collect()
    }

    #[test]
    fn test_gaps_collapse_so_every_bar_is_drawn() {
        // About as many currencies as the daily feed, in an 80-column frame
        let bars = many_bars(43);
        let buf = render_to_buffer(RateBarChart::new(&bars), 78, 22);

        let columns = bar_columns(&buf);
        assert_eq!(columns.len(), 43);
        assert!(columns.windows(2).all(|w| w[1] == w[0] + 1), "Bars should be adjacent");
        assert!(!row_text(&buf, 1).contains("more"));
    }

    #[test]
    fn test_bars_that_do_not_fit_are_counted() {
        let bars = many_bars(50);
        let chart = RateBarChart::new(&bars);
        let area = Rect::new(0, 0, 40, 20);
        let hidden = chart.max_offset(area);

        let buf = render_to_buffer(chart, 40, 20);

        assert!(hidden > 0);
        assert_eq!(bar_columns(&buf).len(), 50 - hidden);
        assert!(row_text(&buf, 1).contains(&format!("+{} more", hidden)));
    }

    #[test]
    fn test_offset_scrolls_to_last_bars() {
        let bars = many_bars(50);
        let area = Rect::new(0, 0, 40, 20);
        let hidden = RateBarChart::new(&bars).max_offset(area);

        // Past the end is clamped to the last full window
        let buf = render_to_buffer(RateBarChart::new(&bars).offset(500), 40, 20);

        let header = row_text(&buf, 1);
        assert!(header.contains(&format!("{} before", hidden)));
        assert!(!header.contains("more"));
        assert_eq!(bar_columns(&buf).len(), 50 - hidden);
    }

    #[test]
    fn test_fit_prefers_dropping_gaps() {
        let bars = many_bars(10);
        let chart = RateBarChart::new(&bars);
        assert_eq!(chart.fit(19), (1, 10));
        assert_eq!(chart.fit(12), (0, 10));
        assert_eq!(chart.fit(6), (0, 6));
    }

    #[test]
    fn test_bar_eighths_scales_to_max() {
        let chart = RateBarChart::new(&[]);
        assert_eq!(chart.bar_eighths(10.0, 10.0, 4), 32);
        assert_eq!(chart.bar_eighths(5.0, 10.0, 4), 16);
        assert_eq!(chart.bar_eighths(0.001, 10.0, 4), 1);
        assert_eq!(chart.bar_eighths(0.0, 10.0, 4), 0);
    }

    #[test]
    fn test_tiny_area_is_ignored() {
        let bars = bars();
        let buf = render_to_buffer(RateBarChart::new(&bars), 3, 3);
        assert!(bar_columns(&buf).is_empty());
    }
}
