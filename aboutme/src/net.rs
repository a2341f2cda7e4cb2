//! Local interface inspection.
//!
//! This looks at the interfaces of the host, not at the API server, so the result
//! may differ from [`Me::ip`](crate::Me).
use std::{
    ffi::CStr,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
};

use crate::error::{Error, Result};

/// The first usable IPv4 address of `interface`, as seen by this host.
pub fn my_ip(interface: &str) -> Result<Ipv4Addr> {
    first_ipv4(interface, interface_addrs()?)
}

/// Pick the first IPv4 address on `interface` that is neither loopback nor unspecified.
pub fn first_ipv4<I>(interface: &str, addrs: I) -> Result<Ipv4Addr>
where
    I: IntoIterator<Item = (String, IpAddr)>,
{
    addrs
        .into_iter()
        .filter(|(name, _)| name == interface)
        .find_map(|(_, ip)| match ip {
            IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
            _ => None,
        })
        .ok_or_else(|| Error::NoAddressFound {
            interface: interface.to_string(),
        })
}

/// Every (interface name, address) pair configured on the host.
pub fn interface_addrs() -> Result<Vec<(String, IpAddr)>> {
    let mut ifap: *mut libc::ifaddrs = std::ptr::null_mut();
    if unsafe { libc::getifaddrs(&mut ifap) } != 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    let mut addrs = Vec::new();
    let mut cursor = ifap;
    while !cursor.is_null() {
        // SAFETY: the list returned by getifaddrs stays valid until freeifaddrs.
        let ifa = unsafe { &*cursor };
        if let Some(ip) = unsafe { sockaddr_to_ip(ifa.ifa_addr) } {
            let name = unsafe { CStr::from_ptr(ifa.ifa_name) }
                .to_string_lossy()
                .into_owned();
            addrs.push((name, ip));
        }
        cursor = ifa.ifa_next;
    }
    unsafe { libc::freeifaddrs(ifap) };

    Ok(addrs)
}

unsafe fn sockaddr_to_ip(addr: *const libc::sockaddr) -> Option<IpAddr> {
    if addr.is_null() {
        return None;
    }
    match (*addr).sa_family as libc::c_int {
        libc::AF_INET => {
            let sin = &*(addr as *const libc::sockaddr_in);
            Some(IpAddr::V4(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr))))
        }
        libc::AF_INET6 => {
            let sin6 = &*(addr as *const libc::sockaddr_in6);
            Some(IpAddr::V6(Ipv6Addr::from(sin6.sin6_addr.s6_addr)))
        }
        _ => None,
    }
}
