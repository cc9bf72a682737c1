//! Subcommand definitions and dispatch.
//!
//! Every command other than `register` and `login` requires a restored
//! session; the acting principal's capability view is resolved and enforced
//! inside the core engine, never here.

use bluecust_core::{CoreEngine, CoreError};
use bluecust_types::{
	BusinessType, Credentials, NewSupplier, OrderDraft, OrderStatus, PaymentMode, Principal,
	ProductionDraft, ProductionStatus, RegisterRequest, Role, SecretToken, SupplierType,
};
use clap::Subcommand;
use std::path::PathBuf;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Create a new account and open a session
	Register {
		#[arg(long)]
		email: String,
		#[arg(long, env = "BLUECUST_PASSWORD", hide_env_values = true)]
		password: String,
		#[arg(long)]
		contact_number: String,
		#[arg(long)]
		business_name: String,
		/// restaurant, hotel, cafe, manufacturer, bottle_manufacturer,
		/// water_supplier or other
		#[arg(long)]
		business_type: BusinessType,
	},
	/// Log into an existing account
	Login {
		#[arg(long)]
		email: String,
		#[arg(long, env = "BLUECUST_PASSWORD", hide_env_values = true)]
		password: String,
	},
	/// Close the current session
	Logout,
	/// Show the current session's principal and capability view
	Whoami,
	/// Order placement and fulfillment
	#[command(subcommand)]
	Orders(OrdersCommand),
	/// Manufacturing production requests
	#[command(subcommand)]
	Production(ProductionCommand),
	/// Supplier directory administration
	#[command(subcommand)]
	Suppliers(SuppliersCommand),
}

#[derive(Subcommand, Debug)]
pub enum OrdersCommand {
	/// Place a new order; the total is quantity times the configured rate
	Place {
		#[arg(long)]
		quantity: u32,
		#[arg(long)]
		sticker_text: String,
		#[arg(long)]
		design_notes: Option<String>,
		/// online or cash
		#[arg(long, default_value = "online")]
		payment_mode: PaymentMode,
	},
	/// List orders: your own, or the whole pool with --all
	List {
		#[arg(long)]
		all: bool,
	},
	/// Move an order to a new status
	SetStatus {
		id: String,
		/// pending, in_progress, completed or cancelled
		status: OrderStatus,
	},
	/// Change the quantity of a non-terminal order; the total is recomputed
	SetQuantity { id: String, quantity: u32 },
	/// Download the bill for an order as a PDF
	Bill {
		id: String,
		/// Where to write the document
		#[arg(long, default_value = "bill.pdf")]
		output: PathBuf,
	},
}

#[derive(Subcommand, Debug)]
pub enum ProductionCommand {
	/// Create a production request routed to a manufacturer
	Create {
		#[arg(long)]
		venture_email: String,
		#[arg(long)]
		venture_name: String,
		#[arg(long)]
		manufacturer_email: String,
		#[arg(long)]
		quantity: u32,
		#[arg(long)]
		sticker_text: String,
		#[arg(long)]
		bottle_type: Option<String>,
		#[arg(long)]
		label_type: Option<String>,
		#[arg(long)]
		cap_color: Option<String>,
		#[arg(long)]
		special_requirements: Option<String>,
		/// Production deadline as a Unix timestamp
		#[arg(long)]
		deadline: Option<u64>,
	},
	/// List requests: your assigned queue, or everything with --all
	List {
		#[arg(long)]
		all: bool,
	},
	/// Move a request to a new status
	SetStatus {
		id: String,
		/// pending, in_production, completed or rejected
		status: ProductionStatus,
	},
	/// Aggregate counts over the visible request set
	Stats,
}

#[derive(Subcommand, Debug)]
pub enum SuppliersCommand {
	/// Add a partner record to the directory
	Add {
		#[arg(long)]
		name: String,
		/// bottle_manufacturer, water_supplier or both
		#[arg(long)]
		supplier_type: SupplierType,
		#[arg(long)]
		contact_number: String,
		#[arg(long)]
		email: String,
		#[arg(long)]
		address: String,
	},
	/// List all partner records
	List,
	/// Remove a partner record
	Remove {
		id: String,
		/// Skip the confirmation prompt
		#[arg(long)]
		yes: bool,
	},
}

/// Restores the persisted session or fails with an actionable message.
async fn require_login(engine: &CoreEngine) -> Result<Principal, Box<dyn std::error::Error>> {
	match engine.restore_session().await? {
		Some(principal) => Ok(principal),
		None => Err("no active session; run `bluecust login` first".into()),
	}
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

pub async fn run(engine: &CoreEngine, command: Command) -> CliResult {
	match command {
		Command::Register {
			email,
			password,
			contact_number,
			business_name,
			business_type,
		} => {
			let principal = engine
				.register(&RegisterRequest {
					email,
					password: SecretToken::new(password),
					contact_number,
					business_name,
					business_type,
				})
				.await?;
			println!(
				"Registered {} as {}",
				principal.email,
				Role::resolve(&principal)
			);
			Ok(())
		}
		Command::Login { email, password } => {
			let principal = engine
				.login(&Credentials {
					email,
					password: SecretToken::new(password),
				})
				.await?;
			println!(
				"Logged in as {} ({})",
				principal.email,
				Role::resolve(&principal)
			);
			Ok(())
		}
		Command::Logout => {
			engine.logout().await?;
			println!("Logged out");
			Ok(())
		}
		Command::Whoami => {
			let principal = require_login(engine).await?;
			println!("{} ({})", principal.email, Role::resolve(&principal));
			Ok(())
		}
		Command::Orders(orders) => run_orders(engine, orders).await,
		Command::Production(production) => run_production(engine, production).await,
		Command::Suppliers(suppliers) => run_suppliers(engine, suppliers).await,
	}
}

async fn run_orders(engine: &CoreEngine, command: OrdersCommand) -> CliResult {
	let principal = require_login(engine).await?;
	match command {
		OrdersCommand::Place {
			quantity,
			sticker_text,
			design_notes,
			payment_mode,
		} => {
			let order = engine
				.orders()
				.place(
					&principal,
					OrderDraft {
						quantity,
						sticker_text,
						sticker_design_notes: design_notes,
						payment_mode,
					},
				)
				.await?;
			print_json(&order)
		}
		OrdersCommand::List { all } => {
			let orders = if all {
				engine.orders().all_orders(&principal).await?
			} else {
				engine.orders().my_orders(&principal).await?
			};
			print_json(&orders)
		}
		OrdersCommand::SetStatus { id, status } => {
			let order = engine.orders().transition(&principal, &id, status).await?;
			print_json(&order)
		}
		OrdersCommand::SetQuantity { id, quantity } => {
			let order = engine
				.orders()
				.set_quantity(&principal, &id, quantity)
				.await?;
			print_json(&order)
		}
		OrdersCommand::Bill { id, output } => {
			let bytes = engine.orders().fetch_bill(&principal, &id).await?;
			std::fs::write(&output, bytes)?;
			println!("Wrote {}", output.display());
			Ok(())
		}
	}
}

async fn run_production(engine: &CoreEngine, command: ProductionCommand) -> CliResult {
	let principal = require_login(engine).await?;
	match command {
		ProductionCommand::Create {
			venture_email,
			venture_name,
			manufacturer_email,
			quantity,
			sticker_text,
			bottle_type,
			label_type,
			cap_color,
			special_requirements,
			deadline,
		} => {
			let request = engine
				.production()
				.create(
					&principal,
					ProductionDraft {
						venture_email,
						venture_name,
						manufacturer_email,
						quantity,
						sticker_text,
						sticker_design_notes: None,
						bottle_type,
						label_type,
						cap_color,
						special_requirements,
						deadline,
					},
				)
				.await?;
			print_json(&request)
		}
		ProductionCommand::List { all } => {
			let requests = if all {
				engine.production().all_requests(&principal).await?
			} else {
				engine.production().assigned_to(&principal).await?
			};
			print_json(&requests)
		}
		ProductionCommand::SetStatus { id, status } => {
			let request = engine
				.production()
				.transition(&principal, &id, status)
				.await?;
			print_json(&request)
		}
		ProductionCommand::Stats => {
			let stats = engine.production().stats_for(&principal).await?;
			print_json(&stats)
		}
	}
}

async fn run_suppliers(engine: &CoreEngine, command: SuppliersCommand) -> CliResult {
	let principal = require_login(engine).await?;
	match command {
		SuppliersCommand::Add {
			name,
			supplier_type,
			contact_number,
			email,
			address,
		} => {
			let record = engine
				.directory()
				.add(
					&principal,
					NewSupplier {
						name,
						supplier_type,
						contact_number,
						email,
						address,
					},
				)
				.await?;
			print_json(&record)
		}
		SuppliersCommand::List => {
			let records = engine.directory().list(&principal).await?;
			print_json(&records)
		}
		SuppliersCommand::Remove { id, yes } => {
			if !yes {
				return Err(format!(
					"removing {} cannot be undone; pass --yes to confirm",
					id
				)
				.into());
			}
			match engine.directory().remove(&principal, &id).await {
				Ok(()) => {
					println!("Removed {}", id);
					Ok(())
				}
				Err(CoreError::NotFound(id)) => Err(format!("no such record: {}", id).into()),
				Err(e) => Err(e.into()),
			}
		}
	}
}
