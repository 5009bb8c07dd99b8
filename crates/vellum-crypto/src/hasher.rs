use vellum_types::ContentDigest;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"vellum-document-v1"`) that is
/// prepended to every hash computation, so a document digest and a commit
/// hash over identical bytes never collide.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for canonical document content (content addresses).
    pub const DOCUMENT: Self = Self {
        domain: "vellum-document-v1",
    };
    /// Hasher for commit records.
    pub const COMMIT: Self = Self {
        domain: "vellum-commit-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = self.start();
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Hash raw bytes and wrap the result as a [`ContentDigest`].
    pub fn digest(&self, data: &[u8]) -> ContentDigest {
        ContentDigest::from_hash(self.hash(data))
    }

    /// An incremental hasher already seeded with this domain tag.
    pub fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
