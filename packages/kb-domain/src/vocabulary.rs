//! Closed vocabularies for chunk metadata.
//!
//! Values are compared by their exact, case-sensitive labels. Anything outside
//! these sets is dropped at the boundary where it enters the system.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Category {
	Economy,
	Governance,
	Judiciary,
	Rights,
}
impl Category {
	pub const ALL: [Self; 4] = [Self::Economy, Self::Governance, Self::Judiciary, Self::Rights];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Economy => "Economy",
			Self::Governance => "Governance",
			Self::Judiciary => "Judiciary",
			Self::Rights => "Rights",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		serde_json::from_value(Value::String(raw.to_string())).ok()
	}
}
impl Display for Category {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Topic {
	Constitution,
	Sovereignty,
	#[serde(rename = "Human Rights")]
	HumanRights,
	Citizenship,
	Democracy,
	#[serde(rename = "Rule of Law")]
	RuleOfLaw,
	Parliament,
	President,
	#[serde(rename = "Cabinet of Ministers")]
	CabinetOfMinisters,
	#[serde(rename = "Executive Power")]
	ExecutivePower,
	Judiciary,
	#[serde(rename = "Constitutional Court")]
	ConstitutionalCourt,
	Justice,
	#[serde(rename = "Law Enforcement")]
	LawEnforcement,
	Elections,
	Referendum,
	#[serde(rename = "Local Self-Government")]
	LocalSelfGovernment,
	#[serde(rename = "National Security")]
	NationalSecurity,
	Defense,
	#[serde(rename = "State of Emergency")]
	StateOfEmergency,
	#[serde(rename = "Martial Law")]
	MartialLaw,
	#[serde(rename = "State Budget")]
	StateBudget,
	Taxation,
	Economy,
	#[serde(rename = "Private Property")]
	PrivateProperty,
	#[serde(rename = "Freedom of Speech")]
	FreedomOfSpeech,
	#[serde(rename = "Freedom of Assembly")]
	FreedomOfAssembly,
	#[serde(rename = "Freedom of Religion")]
	FreedomOfReligion,
	#[serde(rename = "Right to Privacy")]
	RightToPrivacy,
	#[serde(rename = "Right to Education")]
	RightToEducation,
	Healthcare,
	#[serde(rename = "Right to Labor")]
	RightToLabor,
	#[serde(rename = "Social Protection")]
	SocialProtection,
	Environment,
	#[serde(rename = "Territorial Integrity")]
	TerritorialIntegrity,
	#[serde(rename = "State Symbols")]
	StateSymbols,
	#[serde(rename = "National Bank")]
	NationalBank,
	#[serde(rename = "Territorial Structure")]
	TerritorialStructure,
}
impl Topic {
	pub const ALL: [Self; 38] = [
		Self::Constitution,
		Self::Sovereignty,
		Self::HumanRights,
		Self::Citizenship,
		Self::Democracy,
		Self::RuleOfLaw,
		Self::Parliament,
		Self::President,
		Self::CabinetOfMinisters,
		Self::ExecutivePower,
		Self::Judiciary,
		Self::ConstitutionalCourt,
		Self::Justice,
		Self::LawEnforcement,
		Self::Elections,
		Self::Referendum,
		Self::LocalSelfGovernment,
		Self::NationalSecurity,
		Self::Defense,
		Self::StateOfEmergency,
		Self::MartialLaw,
		Self::StateBudget,
		Self::Taxation,
		Self::Economy,
		Self::PrivateProperty,
		Self::FreedomOfSpeech,
		Self::FreedomOfAssembly,
		Self::FreedomOfReligion,
		Self::RightToPrivacy,
		Self::RightToEducation,
		Self::Healthcare,
		Self::RightToLabor,
		Self::SocialProtection,
		Self::Environment,
		Self::TerritorialIntegrity,
		Self::StateSymbols,
		Self::NationalBank,
		Self::TerritorialStructure,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Constitution => "Constitution",
			Self::Sovereignty => "Sovereignty",
			Self::HumanRights => "Human Rights",
			Self::Citizenship => "Citizenship",
			Self::Democracy => "Democracy",
			Self::RuleOfLaw => "Rule of Law",
			Self::Parliament => "Parliament",
			Self::President => "President",
			Self::CabinetOfMinisters => "Cabinet of Ministers",
			Self::ExecutivePower => "Executive Power",
			Self::Judiciary => "Judiciary",
			Self::ConstitutionalCourt => "Constitutional Court",
			Self::Justice => "Justice",
			Self::LawEnforcement => "Law Enforcement",
			Self::Elections => "Elections",
			Self::Referendum => "Referendum",
			Self::LocalSelfGovernment => "Local Self-Government",
			Self::NationalSecurity => "National Security",
			Self::Defense => "Defense",
			Self::StateOfEmergency => "State of Emergency",
			Self::MartialLaw => "Martial Law",
			Self::StateBudget => "State Budget",
			Self::Taxation => "Taxation",
			Self::Economy => "Economy",
			Self::PrivateProperty => "Private Property",
			Self::FreedomOfSpeech => "Freedom of Speech",
			Self::FreedomOfAssembly => "Freedom of Assembly",
			Self::FreedomOfReligion => "Freedom of Religion",
			Self::RightToPrivacy => "Right to Privacy",
			Self::RightToEducation => "Right to Education",
			Self::Healthcare => "Healthcare",
			Self::RightToLabor => "Right to Labor",
			Self::SocialProtection => "Social Protection",
			Self::Environment => "Environment",
			Self::TerritorialIntegrity => "Territorial Integrity",
			Self::StateSymbols => "State Symbols",
			Self::NationalBank => "National Bank",
			Self::TerritorialStructure => "Territorial Structure",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		serde_json::from_value(Value::String(raw.to_string())).ok()
	}
}
impl Display for Topic {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

pub fn category_labels() -> Vec<&'static str> {
	Category::ALL.iter().map(|category| category.as_str()).collect()
}

pub fn topic_labels() -> Vec<&'static str> {
	Topic::ALL.iter().map(|topic| topic.as_str()).collect()
}
