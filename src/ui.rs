use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use log::warn;
use crate::config::Preferences;
use crate::scope::error::ScopeError;
use crate::scope::filter::ButterKind;
use crate::scope::frame::{ChannelSelection, TimeWindow, TraceFrame};
use crate::scripts;
/// Suggested figure sizes in pixels; the middle entry is the default.
const FIGURE_SIZES: [(u32, u32); 3] = [(640, 480), (800, 600), (800, 800)];
const SIZE_DEFAULT: usize = 1;
const MAX_SUGGESTED_FILES: usize = 9;
/// Text-menu front end. Generic over the streams so sessions can be driven
/// from tests.
pub struct Console<R, W> {
    input: R,
    output: W,
}
impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
    fn prompt(&mut self, text: &str) -> Result<String, ScopeError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ScopeError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for a selection",
            )));
        }
        Ok(line.trim().to_owned())
    }
    fn say(&mut self, text: impl Display) -> Result<(), ScopeError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }
    fn prompt_parse<T>(&mut self, label: &str, default: T) -> Result<T, ScopeError>
    where
        T: FromStr + Display + Copy,
    {
        loop {
            let answer = self.prompt(&format!("{label} [{default}]? "))?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(_) => self.say("Invalid value.\nTry again...")?,
            }
        }
    }
    /// Pick a CSV export. Returns `None` when the user terminates instead.
    pub fn select_data_file(
        &mut self,
        search_dir: &Path,
        extension: &str,
    ) -> Result<Option<PathBuf>, ScopeError> {
        let mut dir = search_dir.to_path_buf();
        let mut ext = extension.to_owned();
        loop {
            let files = list_files(&dir, &ext);
            if !files.is_empty() {
                self.say(format!(
                    "\nList of datafiles available at {}:",
                    dir.join(format!("*.{ext}")).display()
                ))?;
                for (i, file) in files.iter().enumerate() {
                    let marker = if i == 0 { "*" } else { " " };
                    self.say(format!(
                        "{i} {marker}\t{}",
                        file.file_name().and_then(|n| n.to_str()).unwrap_or("?")
                    ))?;
                }
                self.say("Select datafile (or terminate program):")?;
                self.say("\tpress integer for file")?;
                self.say("\tpress <enter> to select * default file")?;
                self.say("\tpress c to change search")?;
                self.say("\tpress a to terminate")?;
                let answer = self.prompt("\t?")?.to_lowercase();
                let answer = if answer.is_empty() { "0".into() } else { answer };
                if let Ok(index) = answer.parse::<usize>() {
                    if index < files.len() {
                        return Ok(Some(files[index].clone()));
                    }
                }
                match answer.as_str() {
                    "a" => return Ok(None),
                    "c" => {}
                    _ => {
                        self.say("\nHelp: print one character followed by <enter> key")?;
                        self.say("Try again...\n")?;
                        continue;
                    }
                }
            }
            // Change the search: new directory (with ~ expansion) and extension.
            let answer =
                self.prompt("Enter a directory for ADALM2000 datafile (~ allowed)? ")?;
            if answer.is_empty() {
                self.say("Directory cannot be empty. \nTry again...")?;
                continue;
            }
            let candidate = expand_tilde(&answer);
            if !candidate.is_dir() {
                self.say(format!("Directory not found: {}\nTry again...", candidate.display()))?;
                continue;
            }
            let answer =
                self.prompt("Enter file extension (usually CSV or csv) for ADALM2000 datafile? ")?;
            if list_files(&candidate, &answer).is_empty() {
                self.say(format!(
                    "No files found with: {} \nTry again...",
                    candidate.join(format!("*.{answer}")).display()
                ))?;
                continue;
            }
            dir = candidate;
            ext = answer;
        }
    }
    /// Choose which channels to plot and in what order. A single-channel
    /// capture needs no menu.
    pub fn select_channels(
        &mut self,
        frame: &TraceFrame,
    ) -> Result<ChannelSelection, ScopeError> {
        let labels = &frame.channel_labels;
        if labels.len() == 1 {
            return Ok(ChannelSelection::all(frame));
        }
        loop {
            self.say("\nList of channels to plot:")?;
            for (i, label) in labels.iter().enumerate() {
                self.say(format!("{} = {label}", letter(i)))?;
            }
            self.say(format!(
                "Select channel letters from a to {} in desired order followed by <enter>:",
                letter(labels.len() - 1)
            ))?;
            self.say("\tor press <enter> to plot all channels in current order")?;
            let answer = self.prompt("\t?")?.to_lowercase();
            if answer.is_empty() {
                return Ok(ChannelSelection::all(frame));
            }
            let mut selected = Vec::with_capacity(answer.len());
            let mut valid = true;
            for ch in answer.chars() {
                let index = (ch as usize).wrapping_sub('a' as usize);
                match labels.get(index) {
                    Some(label) => selected.push(label.clone()),
                    None => {
                        valid = false;
                        break;
                    }
                }
            }
            if !valid || selected.is_empty() {
                self.say("Invalid heading selection, try again:")?;
                continue;
            }
            return Ok(ChannelSelection::new(selected));
        }
    }
    /// Time window over the capture; plain <enter> keeps the full span.
    pub fn select_time_window(
        &mut self,
        frame: &TraceFrame,
    ) -> Result<TimeWindow, ScopeError> {
        let full = TimeWindow::full(frame);
        loop {
            self.say(format!(
                "\nCapture spans {:.6} S to {:.6} S.",
                full.start_s, full.end_s
            ))?;
            let start = self.prompt_parse("Window start in seconds", full.start_s)?;
            let end = self.prompt_parse("Window end in seconds", full.end_s)?;
            let window = TimeWindow::new(start, end);
            let intersects = frame.time_s.iter().any(|t| window.contains(*t));
            if intersects {
                return Ok(window);
            }
            self.say("Window does not intersect the capture.\nTry again...")?;
        }
    }
    /// Pick the custom script by registered name and refresh its parameters;
    /// the choices are written back to the preferences for the next run.
    pub fn select_custom_script(
        &mut self,
        prefs: &mut Preferences,
        frame: &TraceFrame,
    ) -> Result<(), ScopeError> {
        let names = scripts::registered_names();
        let current = names
            .iter()
            .position(|n| **n == prefs.custom_script)
            .unwrap_or(0);
        loop {
            self.say("\nList of custom scripts:")?;
            for (i, name) in names.iter().enumerate() {
                let marker = if i == current { "*" } else { " " };
                self.say(format!("{i} {marker}\t{name}"))?;
            }
            let answer = self.prompt("Select custom script (<enter> for *)?\t")?;
            let index = if answer.is_empty() {
                current
            } else {
                match answer.parse::<usize>() {
                    Ok(index) if index < names.len() => index,
                    _ => {
                        self.say("\nHelp: print one integer followed by <enter> key")?;
                        self.say("Try again...\n")?;
                        continue;
                    }
                }
            };
            prefs.custom_script = names[index].to_owned();
            break;
        }
        match prefs.custom_script.as_str() {
            "fft" => {
                prefs.fft.channel =
                    self.prompt_channel("FFT channel", &prefs.fft.channel.clone(), frame)?;
                prefs.fft.reduce =
                    self.prompt_parse("Sample reduction factor", prefs.fft.reduce)?.max(1);
                prefs.fft.peak_count =
                    self.prompt_parse("Peaks to display (-1 for all)", prefs.fft.peak_count)?;
                prefs.fft.min_peak_height =
                    self.prompt_parse("Minimum peak height in Volts", prefs.fft.min_peak_height)?;
            }
            "butter" => {
                prefs.butter.channel =
                    self.prompt_channel("Filter channel", &prefs.butter.channel.clone(), frame)?;
                prefs.butter.kind = self.prompt_filter_kind(prefs.butter.kind)?;
                prefs.butter.order = self.prompt_parse("Filter order", prefs.butter.order)?;
                prefs.butter.low_cut_hz =
                    self.prompt_parse("Low cutoff in Hz", prefs.butter.low_cut_hz)?;
                prefs.butter.high_cut_hz =
                    self.prompt_parse("High cutoff in Hz", prefs.butter.high_cut_hz)?;
            }
            _ => {}
        }
        Ok(())
    }
    fn prompt_channel(
        &mut self,
        label: &str,
        default: &str,
        frame: &TraceFrame,
    ) -> Result<String, ScopeError> {
        loop {
            self.say(format!(
                "Headings with data available: {:?}",
                frame.channel_labels
            ))?;
            let answer = self.prompt(&format!("{label} [{default}]? "))?;
            let choice = if answer.is_empty() {
                default.to_owned()
            } else {
                answer
            };
            if frame.channel_labels.iter().any(|l| *l == choice) {
                return Ok(choice);
            }
            self.say(format!("Channel not found: {choice}\nTry again..."))?;
        }
    }
    fn prompt_filter_kind(&mut self, default: ButterKind) -> Result<ButterKind, ScopeError> {
        loop {
            let kinds: Vec<&str> = ButterKind::ALL.iter().map(|k| k.as_str()).collect();
            self.say(format!("Filter types available: {kinds:?}"))?;
            let answer = self.prompt(&format!("Filter type [{}]? ", default.as_str()))?;
            if answer.is_empty() {
                return Ok(default);
            }
            match ButterKind::from_name(&answer) {
                Some(kind) => return Ok(kind),
                None => self.say("Invalid filter type.\nTry again...")?,
            }
        }
    }
    /// Figure size in pixels, from the suggestion list or entered manually.
    pub fn select_figure_size(&mut self) -> Result<(u32, u32), ScopeError> {
        loop {
            self.say("\nList of suggested plot figure sizes (width, height):")?;
            for (i, (w, h)) in FIGURE_SIZES.iter().enumerate() {
                let marker = if i == SIZE_DEFAULT { "*" } else { " " };
                self.say(format!("{i} {marker}\t{w}, {h}"))?;
            }
            self.say("Select plot size in pixels:")?;
            self.say("\tpress integer for figure size")?;
            self.say("\tpress <enter> to select * default size")?;
            self.say("\tpress c to enter a custom size")?;
            let answer = self.prompt("\t?")?.to_lowercase();
            let answer = if answer.is_empty() {
                SIZE_DEFAULT.to_string()
            } else {
                answer
            };
            if let Ok(index) = answer.parse::<usize>() {
                if index < FIGURE_SIZES.len() {
                    return Ok(FIGURE_SIZES[index]);
                }
            }
            if answer != "c" {
                self.say("\nHelp: print one character followed by <enter> key")?;
                self.say("Try again...\n")?;
                continue;
            }
            let width = self.prompt_parse("Desired width of plot in pixels", 800u32)?;
            let height = self.prompt_parse("Desired height of plot in pixels", 600u32)?;
            if (100..=4000).contains(&width) && (100..=4000).contains(&height) {
                return Ok((width, height));
            }
            self.say("Desired size was out of scope\nPlease try again...\n")?;
        }
    }
    /// Where to save the plot image; `None` skips saving.
    pub fn select_output_file(
        &mut self,
        data_file: &Path,
    ) -> Result<Option<PathBuf>, ScopeError> {
        let (suggestions, notes, exhausted) = suggest_output_files(data_file);
        loop {
            self.say("\nSuggested filenames to save graph results:")?;
            for (i, path) in suggestions.iter().enumerate() {
                self.say(format!("{i}\t{}\t{}", path.display(), notes[i]))?;
            }
            if exhausted {
                self.say("Warning: all suggested files already exist")?;
            }
            self.say("Select graph file option:")?;
            self.say("\tpress integer for file")?;
            self.say("\tpress c to change filename")?;
            self.say("\tpress s to skip saving of a graphic file")?;
            let answer = self.prompt("\t?")?.to_lowercase();
            if let Ok(index) = answer.parse::<usize>() {
                if index < suggestions.len() {
                    return Ok(Some(suggestions[index].clone()));
                }
            }
            match answer.as_str() {
                "s" => return Ok(None),
                "c" => {}
                _ => {
                    self.say("\nHelp: print one character followed by <enter> key")?;
                    self.say("Try again...\n")?;
                    continue;
                }
            }
            let answer =
                self.prompt("Enter full graphic file name with path and extension: ")?;
            let candidate = expand_tilde(&answer);
            match candidate.parent() {
                Some(parent) if parent.as_os_str().is_empty() || parent.is_dir() => {}
                _ => {
                    self.say("\nError: path does not exist")?;
                    continue;
                }
            }
            if candidate.exists() {
                self.say("\nWarning: file already exists")?;
                let confirm = self.prompt("press y to replace file: ")?;
                if !confirm.eq_ignore_ascii_case("y") {
                    continue;
                }
            }
            return Ok(Some(candidate));
        }
    }
}
fn letter(index: usize) -> char {
    (b'a' + (index % 26) as u8) as char
}
fn expand_tilde(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest.trim_start_matches('/'));
        }
        warn!("~ shortcut not available; using the literal path");
    }
    PathBuf::from(input)
}
fn list_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}
/// Output suggestions: the data file renamed to `.png`, then `_0` .. `_9`
/// fallbacks while targets already exist. Existing files carry a warning.
fn suggest_output_files(data_file: &Path) -> (Vec<PathBuf>, Vec<&'static str>, bool) {
    const REPLACE_NOTE: &str = "(Warning: file would be replaced if selected)";
    let original = data_file.with_extension("png");
    let mut suggestions = vec![original.clone()];
    let mut notes = vec![""];
    let mut exhausted = false;
    if original.exists() {
        notes[0] = REPLACE_NOTE;
        let stem = data_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = data_file.parent().unwrap_or_else(|| Path::new("."));
        exhausted = true;
        for i in 0..=MAX_SUGGESTED_FILES {
            let candidate = dir.join(format!("{stem}_{i}.png"));
            if candidate.exists() {
                suggestions.push(candidate);
                notes.push(REPLACE_NOTE);
            } else {
                suggestions.push(candidate);
                notes.push("");
                exhausted = false;
                break;
            }
        }
    }
    (suggestions, notes, exhausted)
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    fn frame() -> TraceFrame {
        TraceFrame {
            sample_rate_hz: 1000.0,
            time_heading: "Time(S)".into(),
            time_s: vec![0.0, 0.001, 0.002, 0.003],
            channel_labels: vec!["CH1(V)".into(), "CH2(V)".into(), "M1(V)".into()],
            channels: vec![vec![0.0; 4], vec![1.0; 4], vec![2.0; 4]],
        }
    }
    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }
    #[test]
    fn enter_selects_all_channels() {
        let frame = frame();
        let selection = console("\n").select_channels(&frame).unwrap();
        assert_eq!(selection, ChannelSelection::all(&frame));
    }
    #[test]
    fn letters_select_channels_in_order() {
        let frame = frame();
        let selection = console("cb\n").select_channels(&frame).unwrap();
        assert_eq!(selection.labels, vec!["M1(V)", "CH2(V)"]);
    }
    #[test]
    fn invalid_letters_retry() {
        let frame = frame();
        let selection = console("z\nab\n").select_channels(&frame).unwrap();
        assert_eq!(selection.labels, vec!["CH1(V)", "CH2(V)"]);
    }
    #[test]
    fn single_channel_needs_no_input() {
        let mut frame = frame();
        frame.channel_labels.truncate(1);
        frame.channels.truncate(1);
        let selection = console("").select_channels(&frame).unwrap();
        assert_eq!(selection.labels, vec!["CH1(V)"]);
    }
    #[test]
    fn window_defaults_to_full_span() {
        let frame = frame();
        let window = console("\n\n").select_time_window(&frame).unwrap();
        assert_eq!(window, TimeWindow::full(&frame));
    }
    #[test]
    fn window_outside_capture_retries() {
        let frame = frame();
        let window = console("9\n10\n0.001\n0.002\n")
            .select_time_window(&frame)
            .unwrap();
        assert_eq!(window, TimeWindow::new(0.001, 0.002));
    }
    #[test]
    fn figure_size_menu() {
        assert_eq!(console("\n").select_figure_size().unwrap(), (800, 600));
        assert_eq!(console("0\n").select_figure_size().unwrap(), (640, 480));
        assert_eq!(
            console("c\n1024\n768\n").select_figure_size().unwrap(),
            (1024, 768)
        );
    }
    #[test]
    fn script_menu_updates_preferences() {
        let frame = frame();
        let mut prefs = Preferences::default();
        // butter=0, fft=1, null=2; pick fft and update its parameters.
        let mut console = console("1\nM1(V)\n20\n2\n0.05\n");
        console.select_custom_script(&mut prefs, &frame).unwrap();
        assert_eq!(prefs.custom_script, "fft");
        assert_eq!(prefs.fft.channel, "M1(V)");
        assert_eq!(prefs.fft.reduce, 20);
        assert_eq!(prefs.fft.peak_count, 2);
        assert!((prefs.fft.min_peak_height - 0.05).abs() < 1e-12);
    }
    #[test]
    fn script_menu_keeps_defaults_on_enter() {
        let frame = frame();
        let mut prefs = Preferences::default();
        prefs.custom_script = "butter".into();
        let mut console = console("\nCH2(V)\n\n\n\n\n");
        console.select_custom_script(&mut prefs, &frame).unwrap();
        assert_eq!(prefs.custom_script, "butter");
        assert_eq!(prefs.butter.channel, "CH2(V)");
        assert_eq!(prefs.butter.order, 3);
        assert_eq!(prefs.butter.kind, ButterKind::Bandpass);
    }
    #[test]
    fn data_file_menu_selects_and_aborts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.csv"), "x").unwrap();
        std::fs::write(dir.path().join("b.csv"), "x").unwrap();
        std::fs::write(dir.path().join("c.txt"), "x").unwrap();
        let picked = console("1\n")
            .select_data_file(dir.path(), "csv")
            .unwrap()
            .unwrap();
        assert_eq!(picked.file_name().unwrap(), "b.csv");
        let aborted = console("a\n").select_data_file(dir.path(), "csv").unwrap();
        assert!(aborted.is_none());
    }
    #[test]
    fn output_file_suggestions_avoid_existing() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("lab.csv");
        std::fs::write(&data, "x").unwrap();
        let picked = console("0\n").select_output_file(&data).unwrap().unwrap();
        assert_eq!(picked, dir.path().join("lab.png"));
        std::fs::write(dir.path().join("lab.png"), "x").unwrap();
        let picked = console("1\n").select_output_file(&data).unwrap().unwrap();
        assert_eq!(picked, dir.path().join("lab_0.png"));
        assert!(console("s\n").select_output_file(&data).unwrap().is_none());
    }
    #[test]
    fn eof_is_an_error_not_a_hang() {
        let frame = frame();
        assert!(console("").select_time_window(&frame).is_err());
    }
}
