use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Build records ─────────────────────────────────────────────────────────────

/// One image build read from the database dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Build identifier from the dump.
    pub id: String,
    /// Owning organization; the unit of "user" counting.
    pub org_id: String,
    /// UTC timestamp when the build was created. Always present; a dump row
    /// without a parseable creation time is malformed.
    pub created_at: DateTime<Utc>,
    /// Image type string, e.g. `"ami"`, `"edge-commit"`, `"qcow2"`.
    pub image_type: String,
    /// Packages selected for the image.
    #[serde(default)]
    pub packages: Vec<String>,
    /// Filesystem customizations applied to the image.
    #[serde(default)]
    pub filesystem: Vec<String>,
    /// Custom payload repositories configured for the build.
    #[serde(default)]
    pub payload_repositories: Vec<String>,
}

// ── Subscription records ──────────────────────────────────────────────────────

/// One registered system instance from a subscription export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Unique instance identifier; the deduplication key.
    pub uuid: String,
    /// Owning organization.
    pub org_id: String,
    /// Product element, e.g. `"cloudapi-v2"` for service-API instances.
    pub element: String,
    /// UTC timestamp when the instance was registered.
    pub created: DateTime<Utc>,
    /// Last check-in time; `None` when the instance never checked in.
    pub last_checkin: Option<DateTime<Utc>>,
}

// ── Customer directory ────────────────────────────────────────────────────────

/// One row of the customer directory used for name resolution and
/// name-pattern exclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub org_id: String,
    pub org_name: String,
    pub strategic: String,
}

// ── Footprints ────────────────────────────────────────────────────────────────

/// Coarse category of where an image is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Footprint {
    BareMetal,
    Edge,
    Aws,
    Azure,
    Gcp,
    GuestImage,
    Vsphere,
}

/// Footprint category set used when public clouds and private
/// virtualization are each merged into a single bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FootprintGroup {
    BareMetal,
    Edge,
    Cloud,
    PrivateCloud,
}

impl Footprint {
    /// Classify an image type string.
    ///
    /// The mapping is a fixed lookup, not inferred. Image types with no
    /// entry classify as [`Footprint::GuestImage`], the catch-all for
    /// generic disk images.
    pub fn from_image_type(image_type: &str) -> Footprint {
        match image_type {
            "ami" | "aws" | "aws-rhui" | "aws-ha-rhui" | "aws-sap-rhui" => Footprint::Aws,
            "vhd" | "azure" | "azure-rhui" | "azure-eap7-rhui" | "azure-sap-rhui" => {
                Footprint::Azure
            }
            "gce" | "gcp" | "gcp-rhui" => Footprint::Gcp,
            "edge-commit" | "edge-container" | "edge-installer" | "edge-ami" | "edge-raw-image"
            | "edge-vsphere" | "iot-commit" => Footprint::Edge,
            "image-installer" => Footprint::BareMetal,
            "vsphere" | "vsphere-ova" | "vmdk" | "ova" => Footprint::Vsphere,
            _ => Footprint::GuestImage,
        }
    }

    /// Merge into the grouped category set: the three public clouds become
    /// `cloud`, guest-image and vSphere become `private-cloud`.
    pub fn group(self) -> FootprintGroup {
        match self {
            Footprint::BareMetal => FootprintGroup::BareMetal,
            Footprint::Edge => FootprintGroup::Edge,
            Footprint::Aws | Footprint::Azure | Footprint::Gcp => FootprintGroup::Cloud,
            Footprint::GuestImage | Footprint::Vsphere => FootprintGroup::PrivateCloud,
        }
    }

    /// The kebab-case label used in reports and series files.
    pub fn label(self) -> &'static str {
        match self {
            Footprint::BareMetal => "bare-metal",
            Footprint::Edge => "edge",
            Footprint::Aws => "aws",
            Footprint::Azure => "azure",
            Footprint::Gcp => "gcp",
            Footprint::GuestImage => "guest-image",
            Footprint::Vsphere => "vsphere",
        }
    }
}

impl FootprintGroup {
    /// The kebab-case label used in reports and series files.
    pub fn label(self) -> &'static str {
        match self {
            FootprintGroup::BareMetal => "bare-metal",
            FootprintGroup::Edge => "edge",
            FootprintGroup::Cloud => "cloud",
            FootprintGroup::PrivateCloud => "private-cloud",
        }
    }
}

impl std::fmt::Display for Footprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::fmt::Display for FootprintGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
