use binrw::binrw;

/// Skinning envelope: a set of weighted joint indices.
#[binrw]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    #[bw(try_calc = weights.len().try_into())]
    weight_count: u16,
    #[br(count = weight_count)]
    pub weights: Vec<EnvelopeWeight>,
}

#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EnvelopeWeight {
    pub index: u16,
    pub weight: f32,
}

impl Envelope {
    pub fn total_weight(&self) -> f32 { self.weights.iter().map(|w| w.weight).sum() }
}
