use zyra_common::models::MediaItem;

/// Seconds as `m:ss`, or `h:mm:ss` once an hour is reached.
pub fn format_duration(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hrs > 0 {
        format!("{hrs}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// Filled/empty block bar. An unknown total renders an empty bar.
pub fn progress_bar(elapsed: u64, total: u64, length: usize) -> String {
    if elapsed == 0 || total == 0 {
        return "▬".repeat(length);
    }
    let progress = (elapsed as f64 / total as f64).min(1.0);
    let filled = ((progress * length as f64).round() as usize).min(length);
    format!("{}{}", "█".repeat(filled), "▬".repeat(length - filled))
}

/// A thin line with a single marker, e.g. for volume.
pub fn slider(value: u64, max: u64, length: usize) -> String {
    let position = if max == 0 {
        0
    } else {
        ((value.min(max) as f64 / max as f64) * length as f64).floor() as usize
    };
    (0..length)
        .map(|i| if i == position { 'o' } else { '─' })
        .collect()
}

/// Sum of the known durations.
pub fn total_duration<'a, I>(items: I) -> u64
where
    I: IntoIterator<Item = &'a MediaItem>,
{
    items.into_iter().map(|i| i.duration_secs).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_hours() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(5), "0:05");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(3599), "59:59");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn progress_bar_is_proportional() {
        assert_eq!(progress_bar(0, 100, 4), "▬▬▬▬");
        assert_eq!(progress_bar(50, 100, 4), "██▬▬");
        assert_eq!(progress_bar(500, 100, 4), "████");
        assert_eq!(progress_bar(10, 0, 3), "▬▬▬");
    }

    #[test]
    fn slider_marks_position() {
        assert_eq!(slider(0, 100, 5), "o────");
        assert_eq!(slider(50, 100, 4), "──o─");
        // Full scale falls off the end of the line.
        assert_eq!(slider(100, 100, 4), "────");
    }
}
