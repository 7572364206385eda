use anyhow::Result;
use log::error;
use plotters::prelude::RGBColor;

pub static FONT_SIZE: i32 = 28;
pub static TITLE_FONT_SIZE: i32 = 40;
pub static LABEL_FONT_SIZE: i32 = 34;
pub static STROKE_WIDTH: u32 = 3;
pub static BASELINE_STROKE_WIDTH: u32 = 4;
pub static MARKER_SIZE: i32 = 5;

/// Opacity of the desirable-region shading.
pub static SHADE_OPACITY: f64 = 0.1;

pub static PLOT_SIZE: (u32, u32) = (1280, 960);
pub static LEGEND_SIZE: (u32, u32) = (360, 480);

pub fn get_color_from_label(label: &str) -> Result<RGBColor> {
    match label {
        "black" => Ok(RGBColor(0, 0, 0)),
        "blue" => Ok(RGBColor(31, 119, 180)),
        "orange" => Ok(RGBColor(255, 127, 14)),
        "green" => Ok(RGBColor(44, 160, 44)),
        "red" => Ok(RGBColor(214, 39, 40)),
        "purple" => Ok(RGBColor(148, 103, 189)),
        "yellow" => Ok(RGBColor(191, 191, 0)),
        "magenta" => Ok(RGBColor(191, 0, 191)),
        _ => {
            error!("unrecognized label for color (label={label})");
            anyhow::bail!("unrecognized label (label={label})");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_labels() {
        assert_eq!(get_color_from_label("yellow").unwrap(), RGBColor(191, 191, 0));
        assert!(get_color_from_label("chartreuse").is_err());
    }
}
