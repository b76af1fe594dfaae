use crate::color::{ColorScale, Rgb};
use crate::error::Result;
use crate::join::JoinIndex;

/// Pointer offset so the panel does not sit under the cursor.
const POINTER_OFFSET: f64 = 10.0;

/// The single floating info panel. Created once with its controller; hovering
/// updates it in place and toggles visibility, nothing is recreated per hover.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipPanel {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub education: f64,
    pub background: Rgb,
}

impl TooltipPanel {
    fn hidden() -> Self {
        Self {
            visible: false,
            x: 0.0,
            y: 0.0,
            text: String::new(),
            education: 0.0,
            background: Rgb { r: 0, g: 0, b: 0 },
        }
    }
}

/// Two states only: hidden, or visible for one region.
pub struct TooltipController<'a> {
    index: &'a JoinIndex,
    scale: &'a ColorScale,
    panel: TooltipPanel,
}

impl<'a> TooltipController<'a> {
    pub fn new(index: &'a JoinIndex, scale: &'a ColorScale) -> Self {
        Self {
            index,
            scale,
            panel: TooltipPanel::hidden(),
        }
    }

    /// Shows the panel near the pointer for the hovered county. The background
    /// matches the region's fill color. An unknown fips leaves the panel as-is
    /// and surfaces the join mismatch.
    pub fn pointer_enter(&mut self, fips: u32, pointer_x: f64, pointer_y: f64) -> Result<()> {
        let record = self.index.lookup(fips)?;
        let pct = record.bachelors_or_higher;
        self.panel.visible = true;
        self.panel.x = pointer_x + POINTER_OFFSET;
        self.panel.y = pointer_y + POINTER_OFFSET;
        self.panel.text = format!("{}, {}\n{}%", record.area_name, record.state, pct);
        self.panel.education = pct;
        self.panel.background = self.scale.color_of(pct);
        Ok(())
    }

    pub fn pointer_leave(&mut self) {
        self.panel.visible = false;
    }

    pub fn panel(&self) -> &TooltipPanel {
        &self.panel
    }
}
