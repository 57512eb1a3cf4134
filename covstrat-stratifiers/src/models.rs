use covstrat_core::BaseWindow;

///
/// Reference bases around one position. The window is clipped at contig edges,
/// so the center may sit anywhere inside `bases`.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceWindow {
    bases: Vec<u8>,
    center: usize,
}

impl ReferenceWindow {
    /// Returns `None` when `center` lies outside `bases`.
    pub fn new(bases: Vec<u8>, center: usize) -> Option<Self> {
        if center < bases.len() {
            Some(ReferenceWindow { bases, center })
        } else {
            None
        }
    }

    ///
    /// Cut the window for `position` (0-based) out of a whole contig sequence.
    ///
    /// # Arguments
    /// - contig: the contig's bases
    /// - position: the position the window is centered on
    /// - window: bases to keep before and after the position
    ///
    pub fn from_contig(contig: &[u8], position: usize, window: BaseWindow) -> Option<Self> {
        if position >= contig.len() {
            return None;
        }
        let start = position.saturating_sub(window.leading as usize);
        let end = (position + window.trailing as usize + 1).min(contig.len());
        ReferenceWindow::new(contig[start..end].to_vec(), position - start)
    }

    pub fn center_base(&self) -> u8 {
        self.bases[self.center]
    }

    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    /// The bases of `window` around the center, clipped to what is available.
    pub fn slice(&self, window: BaseWindow) -> &[u8] {
        let start = self.center.saturating_sub(window.leading as usize);
        let end = (self.center + window.trailing as usize + 1).min(self.bases.len());
        &self.bases[start..end]
    }
}

/// An annotation overlapping the current position, from a BED or VCF like track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub track: String,
    pub name: Option<String>,
    pub score: Option<f32>,
    /// Read depth (`DP`) recorded for the site.
    pub depth: Option<i64>,
}

impl Feature {
    pub fn new<S: Into<String>>(track: S) -> Self {
        Feature {
            track: track.into(),
            ..Default::default()
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = Some(depth);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignedRead {
    pub name: String,
    pub read_group: Option<String>,
    /// Signed template length as reported by the aligner.
    pub fragment_length: i64,
    pub reverse_strand: bool,
    pub first_of_pair: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PileupElement {
    pub read: AlignedRead,
    pub base_quality: u8,
}

/// Everything known about one reference position.
#[derive(Debug, Clone, Copy)]
pub struct Locus<'a> {
    pub contig: &'a str,
    pub position: u64,
    pub reference: &'a ReferenceWindow,
    pub features: &'a [Feature],
    pub pileup: &'a [PileupElement],
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_window_is_clipped_at_contig_edges() {
        let contig = b"ACGTACGTAC";
        let window = ReferenceWindow::from_contig(contig, 1, BaseWindow::new(3, 2)).unwrap();
        assert_eq!(window.center_base(), b'C');
        assert_eq!(window.bases(), b"ACGT");

        let tail = ReferenceWindow::from_contig(contig, 9, BaseWindow::new(2, 5)).unwrap();
        assert_eq!(tail.bases(), b"TAC");
        assert_eq!(tail.center_base(), b'C');
    }

    #[rstest]
    fn test_slice_narrows_window() {
        let window = ReferenceWindow::new(b"AAGCGTT".to_vec(), 3).unwrap();
        assert_eq!(window.slice(BaseWindow::new(1, 1)), b"GCG");
        assert_eq!(window.slice(BaseWindow::default()), b"C");
        assert_eq!(window.slice(BaseWindow::new(10, 10)), b"AAGCGTT");
    }

    #[rstest]
    fn test_out_of_range_center() {
        assert!(ReferenceWindow::new(b"ACG".to_vec(), 3).is_none());
        assert!(ReferenceWindow::from_contig(b"ACG", 5, BaseWindow::default()).is_none());
    }
}
