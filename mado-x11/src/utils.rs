use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::randr::{self, ConnectionExt as _};
use x11rb::protocol::xproto;
use x11rb::NONE;

pub const DEFAULT_REFRESH_RATE: f64 = 60.0;

/// The fastest refresh rate among the monitors currently driven on the screen
/// of `root`.
pub fn refresh_rate(
    connection: &impl Connection,
    root: xproto::Window,
) -> Result<Option<f64>, ReplyError> {
    let resources = connection
        .randr_get_screen_resources_current(root)?
        .reply()?;

    let mut active_modes = Vec::with_capacity(resources.crtcs.len());
    for &crtc in &resources.crtcs {
        let crtc_info = connection
            .randr_get_crtc_info(crtc, resources.config_timestamp)?
            .reply()?;
        if crtc_info.mode != NONE {
            active_modes.push(crtc_info.mode);
        }
    }

    Ok(fastest_rate(&resources.modes, &active_modes))
}

fn fastest_rate(modes: &[randr::ModeInfo], active_modes: &[randr::Mode]) -> Option<f64> {
    active_modes
        .iter()
        .filter_map(|id| modes.iter().find(|mode| mode.id == *id))
        .filter_map(vertical_rate)
        .fold(None, |fastest: Option<f64>, rate| {
            Some(fastest.map_or(rate, |fastest| fastest.max(rate)))
        })
}

// Same computation as xrandr's mode_refresh().
fn vertical_rate(mode: &randr::ModeInfo) -> Option<f64> {
    let scan_lines = if mode.mode_flags & u32::from(randr::ModeFlag::DOUBLE_SCAN) != 0 {
        mode.vtotal as u32 * 2
    } else if mode.mode_flags & u32::from(randr::ModeFlag::INTERLACE) != 0 {
        mode.vtotal as u32 / 2
    } else {
        mode.vtotal as u32
    };
    let pixels_per_frame = scan_lines as f64 * mode.htotal as f64;
    if pixels_per_frame > 0.0 {
        Some(mode.dot_clock as f64 / pixels_per_frame)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(id: u32, dot_clock: u32, htotal: u16, vtotal: u16, mode_flags: u32) -> randr::ModeInfo {
        randr::ModeInfo {
            id,
            width: 1920,
            height: 1080,
            dot_clock,
            hsync_start: 0,
            hsync_end: 0,
            htotal,
            hskew: 0,
            vsync_start: 0,
            vsync_end: 0,
            vtotal,
            name_len: 0,
            mode_flags,
        }
    }

    #[test]
    fn test_vertical_rate() {
        let rate = vertical_rate(&mode(1, 148_500_000, 2200, 1125, 0)).unwrap();
        assert!((rate - 60.0).abs() < 0.01);

        let interlaced = u32::from(randr::ModeFlag::INTERLACE);
        let rate = vertical_rate(&mode(1, 148_500_000, 2200, 1125, interlaced)).unwrap();
        assert!((rate - 120.0).abs() < 0.1);

        assert_eq!(vertical_rate(&mode(1, 148_500_000, 0, 1125, 0)), None);
    }

    #[test]
    fn test_fastest_rate_of_active_modes() {
        let modes = [
            mode(1, 148_500_000, 2200, 1125, 0),
            mode(2, 297_000_000, 2200, 1125, 0),
            mode(3, 74_250_000, 2200, 1125, 0),
        ];

        let rate = fastest_rate(&modes, &[3, 1]).unwrap();
        assert!((rate - 60.0).abs() < 0.01);
        assert_eq!(fastest_rate(&modes, &[]), None);
        assert_eq!(fastest_rate(&modes, &[42]), None);
    }
}
