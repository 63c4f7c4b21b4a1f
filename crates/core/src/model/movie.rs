/// A movie entry from the question pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub title: String,
    pub rating: String,
    pub image_url: String,
}

impl Movie {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        rating: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            rating: rating.into(),
            image_url: image_url.into(),
        }
    }

    /// Numeric rating. Missing or malformed ratings count as `0.0`.
    #[must_use]
    pub fn rating_value(&self) -> f32 {
        self.rating.trim().parse().unwrap_or(0.0)
    }

    /// Poster URL rewritten to the 600px-wide rendition.
    ///
    /// Everything after the first `._` marker is replaced; URLs without the
    /// marker are returned unchanged.
    #[must_use]
    pub fn resized_image_url(&self) -> String {
        match self.image_url.split_once("._") {
            Some((base, _)) => format!("{base}._V0_UX600_.jpg"),
            None => self.image_url.clone(),
        }
    }
}
