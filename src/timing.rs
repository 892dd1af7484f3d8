use crate::error::ParseError;

const REAL_FIELD: &str = "real";

/// Converts a `time`-style duration such as `0m2.234s` into seconds.
pub fn parse_duration(text: &str) -> Result<f64, ParseError> {
  let (minutes, rest) = text
    .split_once('m')
    .ok_or_else(|| ParseError::new(text, "missing 'm' separator"))?;

  if rest.contains('m') {
    return Err(ParseError::new(text, "more than one 'm' separator"));
  }

  let seconds = rest
    .strip_suffix('s')
    .ok_or_else(|| ParseError::new(text, "missing trailing 's'"))?;

  let minutes: u64 = minutes
    .parse()
    .map_err(|_| ParseError::new(text, "minutes are not an unsigned integer"))?;
  let seconds = parse_seconds(seconds).ok_or_else(|| ParseError::new(text, "seconds are not a non-negative number"))?;

  Ok(minutes as f64 * 60.0 + seconds)
}

/// Reads the contents of a timing artifact.
///
/// A bare number is taken as seconds. Anything else is searched for the
/// `real` line of a shell `time` block. The block closes the artifact, so the
/// last such line wins over subject diagnostics printed before it. Returns
/// `Ok(None)` when the text holds neither.
pub fn parse_artifact(text: &str) -> Result<Option<f64>, ParseError> {
  let trimmed = text.trim();

  if trimmed.parse::<f64>().is_ok() {
    return parse_seconds(trimmed)
      .map(Some)
      .ok_or_else(|| ParseError::new(trimmed, "seconds are not a non-negative number"));
  }

  for line in text.lines().rev() {
    let mut fields = line.split_whitespace();
    if fields.next() != Some(REAL_FIELD) {
      continue;
    }

    let duration = fields
      .next()
      .ok_or_else(|| ParseError::new(line, "'real' line has no duration field"))?;

    return parse_duration(duration).map(Some);
  }

  Ok(None)
}

fn parse_seconds(text: &str) -> Option<f64> {
  text.parse::<f64>().ok().filter(|s| s.is_finite() && *s >= 0.0)
}
