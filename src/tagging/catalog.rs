//! Fixed catalog of inference models
//!
//! Each model lives in the model directory as `<stem>.onnx`, with an optional
//! `<name>.json` sidecar holding its ordered `classes` list.

/// Every model the tagger knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelId {
    /// Discogs EffNet embedding extractor (provider A)
    EffnetEmbedding,
    /// MusiCNN embedding extractor (provider B)
    MusicnnEmbedding,
    /// MSD general tags (50 classes)
    GeneralTags,
    /// MTG-Jamendo genre head
    Genre,
    /// MTG-Jamendo mood/theme head
    MoodTheme,
    /// MTG-Jamendo instrument head
    Instrument,
    /// Voice / instrumental head
    VoiceInstrumental,
    /// Danceability head
    Danceability,
    /// emoMusic arousal/valence regressor
    EmoMusic,
}

impl ModelId {
    pub const ALL: [ModelId; 9] = [
        ModelId::EffnetEmbedding,
        ModelId::MusicnnEmbedding,
        ModelId::GeneralTags,
        ModelId::Genre,
        ModelId::MoodTheme,
        ModelId::Instrument,
        ModelId::VoiceInstrumental,
        ModelId::Danceability,
        ModelId::EmoMusic,
    ];

    /// Position in [`ModelId::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Model name; also the sidecar metadata file stem
    pub fn name(self) -> &'static str {
        match self {
            ModelId::EffnetEmbedding => "discogs-effnet-bs64-1",
            ModelId::MusicnnEmbedding => "msd-musicnn-1-embeddings",
            ModelId::GeneralTags => "msd-musicnn-1",
            ModelId::Genre => "mtg_jamendo_genre-discogs-effnet-1",
            ModelId::MoodTheme => "mtg_jamendo_moodtheme-discogs-effnet-1",
            ModelId::Instrument => "mtg_jamendo_instrument-discogs-effnet-1",
            ModelId::VoiceInstrumental => "voice_instrumental-discogs-effnet-1",
            ModelId::Danceability => "danceability-discogs-effnet-1",
            ModelId::EmoMusic => "emomusic-msd-musicnn-2",
        }
    }

    /// Artifact stems to try, in order
    ///
    /// The full genre graph also exposes EffNet embeddings, so it stands in
    /// when the dedicated extractor is missing.
    pub fn artifact_stems(self) -> &'static [&'static str] {
        match self {
            ModelId::EffnetEmbedding => &[
                "discogs-effnet-bs64-1",
                "mtg_jamendo_genre-discogs-effnet-1",
            ],
            ModelId::MusicnnEmbedding => &["msd-musicnn-1-embeddings"],
            ModelId::GeneralTags => &["msd-musicnn-1"],
            ModelId::Genre => &["mtg_jamendo_genre-discogs-effnet-1"],
            ModelId::MoodTheme => &["mtg_jamendo_moodtheme-discogs-effnet-1"],
            ModelId::Instrument => &["mtg_jamendo_instrument-discogs-effnet-1"],
            ModelId::VoiceInstrumental => &["voice_instrumental-discogs-effnet-1"],
            ModelId::Danceability => &["danceability-discogs-effnet-1"],
            ModelId::EmoMusic => &["emomusic-msd-musicnn-2"],
        }
    }

    /// Whether the model has a label sidecar (embedding extractors do not)
    pub fn has_labels(self) -> bool {
        !matches!(self, ModelId::EffnetEmbedding | ModelId::MusicnnEmbedding)
    }

    /// ONNX input tensor name
    pub fn input_name(self) -> &'static str {
        match self {
            ModelId::EffnetEmbedding => "melspectrogram",
            ModelId::MusicnnEmbedding => "model/Placeholder",
            _ => "embeddings",
        }
    }

    /// Preferred output tensor name, and the position to fall back to
    pub fn output(self) -> (&'static str, usize) {
        match self {
            // [0] = activations, [1] = embeddings
            ModelId::EffnetEmbedding => ("PartitionedCall:1", 1),
            ModelId::MusicnnEmbedding => ("model/dense/BiasAdd", 1),
            ModelId::EmoMusic => ("model/Identity", 0),
            _ => ("model/Sigmoid", 0),
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The two embedding backbones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingSource {
    /// Provider A: multi-domain EffNet embeddings
    Effnet,
    /// Provider B: MusiCNN embeddings
    Musicnn,
}

impl EmbeddingSource {
    pub const ALL: [EmbeddingSource; 2] = [EmbeddingSource::Effnet, EmbeddingSource::Musicnn];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Model producing this embedding
    pub fn model(self) -> ModelId {
        match self {
            EmbeddingSource::Effnet => ModelId::EffnetEmbedding,
            EmbeddingSource::Musicnn => ModelId::MusicnnEmbedding,
        }
    }

    /// Mel frames per input patch
    pub fn patch_frames(self) -> usize {
        match self {
            EmbeddingSource::Effnet => 128,
            EmbeddingSource::Musicnn => 187,
        }
    }

    /// Mel frames between patch starts
    pub fn patch_hop(self) -> usize {
        match self {
            EmbeddingSource::Effnet => 62,
            EmbeddingSource::Musicnn => 93,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EmbeddingSource::Effnet => "effnet",
            EmbeddingSource::Musicnn => "musicnn",
        }
    }
}
